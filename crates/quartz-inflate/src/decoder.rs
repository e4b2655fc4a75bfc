use log::trace;

use crate::adler::Adler32;
use crate::bitstream::BitStreamReader;
use crate::constants::{
    fixed_distance_lengths, fixed_litlen_lengths, DEFLATE_DISTANCE_BASE,
    DEFLATE_DISTANCE_EXTRA_BITS, DEFLATE_LENGTH_BASE, DEFLATE_LENGTH_EXTRA_BITS,
    DEFLATE_MAX_LENS_OVERRUN, DEFLATE_NUM_PRECODE_SYMS, DEFLATE_PRECODE_LENS_PERMUTATION
};
use crate::errors::DecodeErrorStatus::{self, InsufficientData, InvalidBlock, InvalidZlibHeader};
use crate::errors::InflateDecodeErrors;
use crate::huffman::HuffmanTable;

/// Options the deflate decoder respects
#[derive(Copy, Clone)]
pub struct DeflateOptions
{
    limit:            usize,
    confirm_checksum: bool,
    size_hint:        usize
}

impl Default for DeflateOptions
{
    fn default() -> DeflateOptions
    {
        DeflateOptions {
            limit:            1 << 30,
            confirm_checksum: true,
            size_hint:        37 // some random value
        }
    }
}

impl DeflateOptions
{
    /// Get deflate/zlib limit option
    ///
    /// The decoder won't extend the inbuilt limit and will
    /// return an error if the limit is exceeded
    pub const fn get_limit(&self) -> usize
    {
        self.limit
    }
    /// Set a limit to the internal vector
    /// used to store decoded zlib/deflate output.
    ///
    /// # Arguments
    /// limit: The new decompressor limit
    /// # Returns
    /// A modified version of DeflateOptions
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> Self
    {
        self.limit = limit;
        self
    }

    /// Get whether the decoder will confirm a checksum
    /// after decoding
    pub const fn get_confirm_checksum(&self) -> bool
    {
        self.confirm_checksum
    }
    /// Set whether the decoder should confirm a checksum
    /// after decoding
    ///
    /// Note, you should definitely confirm your checksum, use
    /// this with caution, otherwise data returned may be corrupt
    #[must_use]
    pub fn set_confirm_checksum(mut self, yes: bool) -> Self
    {
        self.confirm_checksum = yes;
        self
    }

    /// Get the default size hint for the decompressor
    ///
    /// The decompressor initializes the internal storage for
    /// decompressed bytes with this size
    pub const fn get_size_hint(&self) -> usize
    {
        self.size_hint
    }
    /// Set the size hint for the decompressor
    ///
    /// This can be used to prevent multiple re-allocations
    #[must_use]
    pub const fn set_size_hint(mut self, hint: usize) -> Self
    {
        self.size_hint = hint;
        self
    }
}

/// A deflate decoder instance.
///
/// The decoder manages output buffer as opposed to requiring the caller to provide a pre-allocated buffer
/// it tracks number of bytes written and on successfully reaching the
/// end of the block, will return a vector with exactly
/// the number of decompressed bytes.
pub struct DeflateDecoder<'a>
{
    data:          &'a [u8],
    position:      usize,
    stream:        BitStreamReader<'a>,
    out:           Vec<u8>,
    options:       DeflateOptions,
    is_last_block: bool
}

impl<'a> DeflateDecoder<'a>
{
    /// Create a new decompressor that will read compressed
    /// data from `data` and return a decompressed vector.
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a>
    {
        let options = DeflateOptions::default();

        Self::new_with_options(data, options)
    }
    /// Create new decoder with specified options
    ///
    /// This can be used to fine tune the decoder to the user's
    /// needs.
    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a>
    {
        DeflateDecoder {
            data,
            position: 0,
            stream: BitStreamReader::new(data),
            out: Vec::with_capacity(options.size_hint.min(options.limit)),
            options,
            is_last_block: false
        }
    }
    /// Decode zlib-encoded data returning the uncompressed bytes
    ///
    /// Validates the two byte zlib header, inflates the deflate
    /// payload and, unless disabled via options, confirms the
    /// adler32 trailer against the decompressed output.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        match self.decode_zlib_inner()
        {
            Ok(()) => Ok(core::mem::take(&mut self.out)),
            Err(error) => Err(InflateDecodeErrors::new(
                error,
                core::mem::take(&mut self.out)
            ))
        }
    }

    /// Decode a raw deflate stream, one with no zlib framing
    /// around it
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.stream = BitStreamReader::new(&self.data[self.position..]);

        match self.decode_blocks()
        {
            Ok(()) => Ok(core::mem::take(&mut self.out)),
            Err(error) => Err(InflateDecodeErrors::new(
                error,
                core::mem::take(&mut self.out)
            ))
        }
    }

    fn decode_zlib_inner(&mut self) -> Result<(), DecodeErrorStatus>
    {
        if self.data.len()
            < 2 /* zlib header */
            + 4
        /* adler32 */
        {
            return Err(InsufficientData);
        }

        // Zlib flags
        // See https://www.ietf.org/rfc/rfc1950.txt for
        // the RFC
        let cmf = self.data[0];
        let flg = self.data[1];

        let cm = cmf & 0xF;
        let cinfo = cmf >> 4;

        let fdict = (flg >> 5) & 1;

        // confirm we have the right deflate methods
        if cm != 8
        {
            if cm == 15
            {
                return Err(InvalidZlibHeader(
                    "CM of 15 is reserved by the standard, can't handle it"
                ));
            }
            return Err(InvalidZlibHeader("unknown zlib compression method"));
        }
        if cinfo > 7
        {
            return Err(InvalidZlibHeader("CINFO greater than 7, not allowed"));
        }
        let flag_checks = (u16::from(cmf) * 256) + u16::from(flg);

        if flag_checks % 31 != 0
        {
            return Err(InvalidZlibHeader("FCHECK integrity not preserved"));
        }
        if fdict != 0
        {
            return Err(InvalidZlibHeader("preset dictionaries are not supported"));
        }

        self.position = 2;
        self.stream = BitStreamReader::new(&self.data[self.position..]);

        self.decode_blocks()?;

        // trailer follows the last block on the next byte boundary
        self.stream.align_to_byte();

        let expected_adler = self.stream.get_u32_be()?;

        if self.options.confirm_checksum
        {
            let mut adler = Adler32::new();

            adler.update(&self.out);

            let computed_adler = adler.finish();

            if expected_adler != computed_adler
            {
                return Err(DecodeErrorStatus::MismatchedAdler(
                    expected_adler,
                    computed_adler
                ));
            }
        }

        Ok(())
    }

    /// Inflate deflate blocks until the one flagged
    /// as last finishes
    fn decode_blocks(&mut self) -> Result<(), DecodeErrorStatus>
    {
        loop
        {
            self.is_last_block = self.stream.get_bits(1)? == 1;
            let block_type = self.stream.get_bits(2)?;

            trace!(
                "Deflate block, type {}, final {}",
                block_type,
                self.is_last_block
            );

            match block_type
            {
                0 => self.decode_stored_block()?,
                1 =>
                {
                    let litlen_table = HuffmanTable::build(&fixed_litlen_lengths())?;
                    let dist_table = HuffmanTable::build(&fixed_distance_lengths())?;

                    self.decode_compressed_block(&litlen_table, &dist_table)?;
                }
                2 => self.decode_dynamic_block()?,
                _ => return Err(InvalidBlock("reserved block type 0b11"))
            }

            if self.is_last_block
            {
                return Ok(());
            }
        }
    }

    /// An uncompressed block, a byte aligned LEN/NLEN pair
    /// followed by LEN literal bytes
    fn decode_stored_block(&mut self) -> Result<(), DecodeErrorStatus>
    {
        self.stream.align_to_byte();

        let len = self.stream.get_u16_le()?;
        let nlen = self.stream.get_u16_le()?;

        if len != !nlen
        {
            return Err(InvalidBlock("LEN and NLEN of stored block don't agree"));
        }
        trace!("Stored block, {} bytes", len);

        let bytes = self.stream.get_slice(usize::from(len))?;

        self.reserve_output(usize::from(len))?;
        self.out.extend_from_slice(bytes);

        Ok(())
    }

    /// Read the code length description of a dynamic block and
    /// inflate its payload
    fn decode_dynamic_block(&mut self) -> Result<(), DecodeErrorStatus>
    {
        let num_litlen_syms = 257 + self.stream.get_bits(5)? as usize;
        let num_dist_syms = 1 + self.stream.get_bits(5)? as usize;
        let num_explicit_precode_lens = 4 + self.stream.get_bits(4)? as usize;

        if num_litlen_syms > 286
        {
            return Err(InvalidBlock("too many literal/length symbols"));
        }
        if num_dist_syms > 30
        {
            return Err(InvalidBlock("too many distance symbols"));
        }

        let mut precode_lens = [0_u8; DEFLATE_NUM_PRECODE_SYMS];

        for i in DEFLATE_PRECODE_LENS_PERMUTATION
            .iter()
            .take(num_explicit_precode_lens)
        {
            precode_lens[usize::from(*i)] = self.stream.get_bits(3)? as u8;
        }

        let precode_table = HuffmanTable::build(&precode_lens)?;

        // literal/length and distance lengths are sent as one
        // run-length coded vector
        let num_lens = num_litlen_syms + num_dist_syms;
        let mut lens = [0_u8; DEFLATE_MAX_LENS_OVERRUN];
        let mut position = 0;

        while position < num_lens
        {
            let symbol = precode_table.decode_symbol(&mut self.stream)?;

            let (repeat, value) = match symbol
            {
                0..=15 =>
                {
                    lens[position] = symbol as u8;
                    position += 1;
                    continue;
                }
                16 =>
                {
                    if position == 0
                    {
                        return Err(InvalidBlock("repeat of previous length at stream start"));
                    }
                    let repeat = 3 + self.stream.get_bits(2)? as usize;

                    (repeat, lens[position - 1])
                }
                17 => (3 + self.stream.get_bits(3)? as usize, 0),
                _ => (11 + self.stream.get_bits(7)? as usize, 0)
            };

            if position + repeat > num_lens
            {
                return Err(InvalidBlock("length repeat overflows the alphabet"));
            }
            lens[position..position + repeat].fill(value);
            position += repeat;
        }

        let litlen_table = HuffmanTable::build(&lens[..num_litlen_syms])?;
        let dist_table = HuffmanTable::build(&lens[num_litlen_syms..num_lens])?;

        self.decode_compressed_block(&litlen_table, &dist_table)
    }

    /// Inflate one huffman coded block into the output buffer
    ///
    /// The output vector doubles as the 32 KiB match window,
    /// matches copy byte by byte so a distance smaller than the
    /// length reads bytes the same match just produced.
    fn decode_compressed_block(
        &mut self, litlen_table: &HuffmanTable, dist_table: &HuffmanTable
    ) -> Result<(), DecodeErrorStatus>
    {
        loop
        {
            let symbol = litlen_table.decode_symbol(&mut self.stream)?;

            if symbol < 256
            {
                self.reserve_output(1)?;
                self.out.push(symbol as u8);
                continue;
            }
            if symbol == 256
            {
                // end of block
                return Ok(());
            }

            let length_index = usize::from(symbol - 257);

            if length_index >= DEFLATE_LENGTH_BASE.len()
            {
                return Err(InvalidBlock("literal/length symbol above 285"));
            }

            let extra_bits = DEFLATE_LENGTH_EXTRA_BITS[length_index];
            let length = usize::from(DEFLATE_LENGTH_BASE[length_index])
                + self.stream.get_bits(extra_bits)? as usize;

            let dist_symbol = usize::from(dist_table.decode_symbol(&mut self.stream)?);

            if dist_symbol >= DEFLATE_DISTANCE_BASE.len()
            {
                return Err(InvalidBlock("distance symbol above 29"));
            }

            let extra_bits = DEFLATE_DISTANCE_EXTRA_BITS[dist_symbol];
            let distance = usize::from(DEFLATE_DISTANCE_BASE[dist_symbol])
                + self.stream.get_bits(extra_bits)? as usize;

            if distance > self.out.len()
            {
                return Err(DecodeErrorStatus::InvalidDistance(distance, self.out.len()));
            }

            self.reserve_output(length)?;

            let match_start = self.out.len() - distance;

            for i in 0..length
            {
                let byte = self.out[match_start + i];

                self.out.push(byte);
            }
        }
    }

    /// Confirm the output can grow by `extra` bytes without
    /// crossing the configured limit
    fn reserve_output(&mut self, extra: usize) -> Result<(), DecodeErrorStatus>
    {
        let requested = self.out.len() + extra;

        if requested > self.options.limit
        {
            return Err(DecodeErrorStatus::OutputLimitExceeded(
                self.options.limit,
                requested
            ));
        }
        Ok(())
    }
}
