//! Canonical huffman table construction and symbol decoding.
//!
//! A deflate code is fully described by the codeword length of
//! every symbol; codewords are assigned in symbol order within
//! each length, shorter lengths first (RFC 1951 §3.2.2).

use crate::bitstream::BitStreamReader;
use crate::constants::{DEFLATE_MAX_CODEWORD_LENGTH, DEFLATE_NUM_LITLEN_SYMS};
use crate::errors::DecodeErrorStatus;

/// A canonical prefix code built from a codeword length vector.
///
/// `counts[l]` is the number of symbols with codeword length `l`,
/// `symbols` holds the symbols ordered by (length, symbol index),
/// which is exactly codeword order for a canonical code.
pub(crate) struct HuffmanTable
{
    counts:  [u16; DEFLATE_MAX_CODEWORD_LENGTH + 1],
    symbols: [u16; DEFLATE_NUM_LITLEN_SYMS]
}

impl HuffmanTable
{
    /// Build a decode table from codeword lengths, one length
    /// per symbol, zero meaning the symbol is unused.
    ///
    /// Over-subscribed descriptions (more codewords than a
    /// prefix code of these lengths can hold) are rejected.
    /// Incomplete descriptions are accepted, decoding fails
    /// if the stream ever selects a missing codeword; zlib
    /// streams legitimately describe one-symbol distance codes.
    pub fn build(lengths: &[u8]) -> Result<HuffmanTable, DecodeErrorStatus>
    {
        debug_assert!(lengths.len() <= DEFLATE_NUM_LITLEN_SYMS);

        let mut counts = [0_u16; DEFLATE_MAX_CODEWORD_LENGTH + 1];

        for length in lengths
        {
            if usize::from(*length) > DEFLATE_MAX_CODEWORD_LENGTH
            {
                return Err(DecodeErrorStatus::InvalidHuffman(
                    "codeword length above 15"
                ));
            }
            counts[usize::from(*length)] += 1;
        }

        // Kraft check, no length may claim more codewords
        // than remain unassigned at that depth
        let mut remaining: i32 = 1;

        for count in counts.iter().skip(1)
        {
            remaining <<= 1;
            remaining -= i32::from(*count);

            if remaining < 0
            {
                return Err(DecodeErrorStatus::InvalidHuffman(
                    "code lengths are over-subscribed"
                ));
            }
        }

        // first symbol slot per length
        let mut offsets = [0_u16; DEFLATE_MAX_CODEWORD_LENGTH + 1];

        for length in 1..DEFLATE_MAX_CODEWORD_LENGTH
        {
            offsets[length + 1] = offsets[length] + counts[length];
        }

        let mut symbols = [0_u16; DEFLATE_NUM_LITLEN_SYMS];

        for (symbol, length) in lengths.iter().enumerate()
        {
            if *length != 0
            {
                symbols[usize::from(offsets[usize::from(*length)])] = symbol as u16;
                offsets[usize::from(*length)] += 1;
            }
        }

        Ok(HuffmanTable { counts, symbols })
    }

    /// Decode one symbol off the stream.
    ///
    /// Codewords are walked one bit at a time: bits come off the
    /// stream LSB first but accumulate as the high side of the
    /// codeword value, so at depth `l` we hold the first `l`
    /// stream bits as an `l` bit MSB-first codeword. Canonical
    /// codes of one length occupy a contiguous value range, so
    /// membership is a bounds check against the running first
    /// code of that length.
    pub fn decode_symbol(&self, stream: &mut BitStreamReader) -> Result<u16, DecodeErrorStatus>
    {
        let mut code = 0_usize;
        let mut first = 0_usize;
        let mut index = 0_usize;

        for length in 1..=DEFLATE_MAX_CODEWORD_LENGTH
        {
            code |= stream.get_bits(1)? as usize;

            let count = usize::from(self.counts[length]);

            if code < first + count
            {
                return Ok(self.symbols[index + (code - first)]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(DecodeErrorStatus::InvalidHuffman(
            "stream selects a codeword longer than 15 bits"
        ))
    }
}
