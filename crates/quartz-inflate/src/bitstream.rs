//! A bit reader over a byte slice.
//!
//! Deflate packs bits LSB first: the first bit consumed from
//! a byte is its least significant bit, and the first bit read
//! becomes bit 0 of the returned value. Huffman codewords are
//! the one place this does not apply, see the decode walk in
//! [`huffman`](crate::huffman).

use crate::errors::DecodeErrorStatus;

/// Reads bits LSB first from a borrowed byte slice.
///
/// Invariant: outside of a call, `bits_left < 8`. Bytes are
/// only pulled into the buffer on demand, so aligning to a
/// byte boundary never discards more than seven bits.
pub(crate) struct BitStreamReader<'a>
{
    data:      &'a [u8],
    position:  usize,
    buffer:    u32,
    bits_left: u8
}

impl<'a> BitStreamReader<'a>
{
    pub fn new(data: &'a [u8]) -> BitStreamReader<'a>
    {
        BitStreamReader {
            data,
            position: 0,
            buffer: 0,
            bits_left: 0
        }
    }

    /// Return the next `num_bits` bits of the stream, where
    /// `num_bits <= 16`.
    ///
    /// The first bit consumed is bit 0 of the result.
    #[inline(always)]
    pub fn get_bits(&mut self, num_bits: u8) -> Result<u32, DecodeErrorStatus>
    {
        debug_assert!(num_bits <= 16);

        while self.bits_left < num_bits
        {
            match self.data.get(self.position)
            {
                Some(byte) =>
                {
                    self.buffer |= u32::from(*byte) << self.bits_left;
                    self.bits_left += 8;
                    self.position += 1;
                }
                None => return Err(DecodeErrorStatus::InsufficientData)
            }
        }
        let value = self.buffer & ((1 << num_bits) - 1);

        self.buffer >>= num_bits;
        self.bits_left -= num_bits;

        Ok(value)
    }

    /// Drop the bits held from a partially consumed byte,
    /// moving the reader to the next byte boundary.
    pub fn align_to_byte(&mut self)
    {
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Borrow `num_bytes` raw bytes from the stream.
    ///
    /// The reader must be byte aligned.
    pub fn get_slice(&mut self, num_bytes: usize) -> Result<&'a [u8], DecodeErrorStatus>
    {
        debug_assert_eq!(self.bits_left, 0);

        match self.data.get(self.position..self.position + num_bytes)
        {
            Some(bytes) =>
            {
                self.position += num_bytes;
                Ok(bytes)
            }
            None => Err(DecodeErrorStatus::InsufficientData)
        }
    }

    /// Read a little endian u16, for the LEN/NLEN pair
    /// of a stored block. The reader must be byte aligned.
    pub fn get_u16_le(&mut self) -> Result<u16, DecodeErrorStatus>
    {
        let bytes = self.get_slice(2)?;

        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big endian u32, for the adler32 trailer.
    /// The reader must be byte aligned.
    pub fn get_u32_be(&mut self) -> Result<u32, DecodeErrorStatus>
    {
        let bytes = self.get_slice(4)?;

        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
