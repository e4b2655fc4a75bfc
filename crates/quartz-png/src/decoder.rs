use log::{info, trace};
use quartz_core::bit_depth::BitDepth;
use quartz_core::bytestream::ZByteReader;
use quartz_core::colorspace::ColorSpace;
use quartz_core::options::DecoderOptions;
use quartz_core::result::DecodingResult;
use quartz_inflate::DeflateOptions;

use crate::constants::PNG_SIGNATURE;
use crate::crc::crc32;
use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngErrors;
use crate::filters::{
    handle_avg, handle_avg_first, handle_paeth, handle_paeth_first, handle_sub, handle_up
};

/// A palette entry, one RGB triple from the PLTE chunk
#[derive(Copy, Clone, Default)]
pub(crate) struct PLTEEntry
{
    pub red:   u8,
    pub green: u8,
    pub blue:  u8
}

#[derive(Copy, Clone)]
pub(crate) struct PngChunk
{
    pub length:     usize,
    pub chunk_type: PngChunkType,
    pub chunk:      [u8; 4],
    pub crc:        u32
}

/// A text record from a `tEXt` chunk, latin-1 text
/// under a keyword
#[derive(Clone, Debug)]
pub struct TextChunk
{
    pub keyword: String,
    pub text:    String
}

/// A text record from a `zTXt` chunk, stored deflated
/// in the file and decompressed during parsing
#[derive(Clone, Debug)]
pub struct ZtxtChunk
{
    pub keyword: String,
    pub text:    String
}

/// An international text record from an `iTXt` chunk,
/// utf-8 text tagged with a language and a translated keyword
#[derive(Clone, Debug)]
pub struct ItxtChunk
{
    pub keyword:            String,
    pub language_tag:       String,
    pub translated_keyword: String,
    pub text:               String
}

/// The image last-modification time from a `tIME` chunk
#[derive(Copy, Clone, Debug, Default)]
pub struct TimeInfo
{
    pub year:   u16,
    pub month:  u8,
    pub day:    u8,
    pub hour:   u8,
    pub minute: u8,
    pub second: u8
}

/// Represents PNG information that can be extracted
/// from a png file.
///
/// The properties are read from the IHDR chunk
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo
{
    pub width:            usize,
    pub height:           usize,
    pub depth:            u8,
    pub color:            PngColor,
    pub component:        u8,
    pub interlace_method: InterlaceMethod
}

/// A PNG decoder instance.
///
/// This is the main decoder for png image decoding.
///
/// Instantiate the decoder with either the [new](PngDecoder::new)
/// or [new_with_options](PngDecoder::new_with_options) and
/// using either of the [`decode_raw`](PngDecoder::decode_raw) or
/// [`decode`](PngDecoder::decode) will return pixels present in that image
///
/// # Note
/// The decoder expands images with less than 8 bits per pixel
/// to 8 bits per pixel, grayscale samples are scaled to the full
/// 8 bit domain and palette indices are resolved to RGB.
pub struct PngDecoder<'a>
{
    pub(crate) stream:       ZByteReader<'a>,
    pub(crate) options:      DecoderOptions,
    pub(crate) png_info:     PngInfo,
    pub(crate) palette:      Vec<PLTEEntry>,
    pub(crate) idat_chunks:  Vec<u8>,
    pub(crate) gama:         f32,
    pub(crate) text_chunks:  Vec<TextChunk>,
    pub(crate) ztxt_chunks:  Vec<ZtxtChunk>,
    pub(crate) itxt_chunks:  Vec<ItxtChunk>,
    pub(crate) time_info:    Option<TimeInfo>,
    pub(crate) seen_hdr:     bool,
    pub(crate) seen_ptle:    bool,
    pub(crate) seen_idat:    bool,
    pub(crate) idat_ended:   bool,
    pub(crate) seen_gamma:   bool,
    pub(crate) seen_headers: bool
}

impl<'a> PngDecoder<'a>
{
    pub fn new(data: &'a [u8]) -> PngDecoder<'a>
    {
        let default_opt = DecoderOptions::default();

        PngDecoder::new_with_options(data, default_opt)
    }
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a>
    {
        PngDecoder {
            stream: ZByteReader::new(data),
            options,
            png_info: PngInfo::default(),
            palette: Vec::new(),
            idat_chunks: Vec::with_capacity(37), // randomly chosen size, my favourite number
            gama: 0.0,
            text_chunks: vec![],
            ztxt_chunks: vec![],
            itxt_chunks: vec![],
            time_info: None,
            seen_hdr: false,
            seen_ptle: false,
            seen_idat: false,
            idat_ended: false,
            seen_gamma: false,
            seen_headers: false
        }
    }

    /// Get image dimensions or none if they aren't decoded
    pub const fn get_dimensions(&self) -> Option<(usize, usize)>
    {
        if !self.seen_hdr
        {
            return None;
        }

        Some((self.png_info.width, self.png_info.height))
    }
    pub const fn get_depth(&self) -> Option<BitDepth>
    {
        if !self.seen_hdr
        {
            return None;
        }
        match self.png_info.depth
        {
            1 | 2 | 4 | 8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            _ => unreachable!()
        }
    }
    /// Get image gamma
    pub const fn get_gamma(&self) -> Option<f32>
    {
        if self.seen_gamma
        {
            Some(self.gama)
        }
        else
        {
            None
        }
    }
    /// Get the image modification time, if a tIME chunk
    /// was present
    pub const fn get_time(&self) -> Option<TimeInfo>
    {
        self.time_info
    }
    /// Get the tEXt records found in the stream so far
    pub fn get_text_chunks(&self) -> &[TextChunk]
    {
        &self.text_chunks
    }
    /// Get the zTXt records found in the stream so far
    pub fn get_ztxt_chunks(&self) -> &[ZtxtChunk]
    {
        &self.ztxt_chunks
    }
    /// Get the iTXt records found in the stream so far
    pub fn get_itxt_chunks(&self) -> &[ItxtChunk]
    {
        &self.itxt_chunks
    }
    /// Get the parsed image header, or none if it hasn't
    /// been decoded
    pub fn get_info(&self) -> Option<PngInfo>
    {
        if !self.seen_hdr
        {
            return None;
        }
        Some(self.png_info)
    }
    /// Get image colorspace
    pub fn get_colorspace(&self) -> Option<ColorSpace>
    {
        if !self.seen_hdr
        {
            return None;
        }
        match self.png_info.color
        {
            // palette images resolve to RGB on output
            PngColor::Palette => Some(ColorSpace::RGB),
            PngColor::Luma => Some(ColorSpace::Luma),
            PngColor::LumaA => Some(ColorSpace::LumaA),
            PngColor::RGB => Some(ColorSpace::RGB),
            PngColor::RGBA => Some(ColorSpace::RGBA),
            PngColor::Unknown => unreachable!()
        }
    }

    fn read_chunk_header(&mut self) -> Result<PngChunk, PngErrors>
    {
        // Format is length - chunk type - [data] - crc chunk, load crc chunk now
        let chunk_length = self.stream.get_u32_be_err()? as usize;
        let chunk_type_int = self.stream.get_u32_be_err()?.to_be_bytes();

        if chunk_length > (1 << 31) - 1
        {
            return Err(PngErrors::InvalidStructure(format!(
                "Chunk length {chunk_length} above the 2^31-1 bound"
            )));
        }

        let chunk_type = match &chunk_type_int
        {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,
            b"gAMA" => PngChunkType::gAMA,
            b"tIME" => PngChunkType::tIME,
            b"tEXt" => PngChunkType::tEXt,
            b"zTXt" => PngChunkType::zTXt,
            b"iTXt" => PngChunkType::iTXt,
            _ => PngChunkType::unkn
        };

        if !self.stream.has(chunk_length + 4 /*crc stream*/)
        {
            return Err(PngErrors::TruncatedStream(
                chunk_length + 4,
                self.stream.remaining()
            ));
        }

        let mut crc_bytes = [0; 4];

        let crc_ref = self.stream.peek_at(chunk_length, 4)?;

        crc_bytes.copy_from_slice(crc_ref);

        let crc = u32::from_be_bytes(crc_bytes);

        // Confirm the CRC here.
        if self.options.png_get_confirm_crc()
        {
            // go back and point to chunk type.
            self.stream.rewind(4);
            // read chunk type + chunk data
            let bytes = self.stream.peek_at(0, chunk_length + 4)?;

            let calc_crc = crc32(bytes);

            if crc != calc_crc
            {
                return Err(PngErrors::BadCrc(crc, calc_crc));
            }
            // go point after the chunk type
            // The other parts expect the reader to point to the
            // start of the chunk data.
            self.stream.skip(4);
        }

        Ok(PngChunk {
            length: chunk_length,
            chunk: chunk_type_int,
            chunk_type,
            crc
        })
    }

    pub fn decode_headers(&mut self) -> Result<(), PngErrors>
    {
        if self.seen_headers
        {
            return Ok(());
        }
        // READ PNG signature
        let signature = self.stream.get_u64_be_err()?;

        if signature != PNG_SIGNATURE
        {
            return Err(PngErrors::BadSignature);
        }

        // check if first chunk is ihdr here
        if self.stream.peek_at(4, 4)? != b"IHDR"
        {
            return Err(PngErrors::InvalidStructure(
                "First chunk is not IHDR, corrupt PNG".to_string()
            ));
        }
        loop
        {
            let header = self.read_chunk_header()?;

            // a chunk of any other type closes the IDAT run,
            // the payloads must be back to back in the stream
            if self.seen_idat && header.chunk_type != PngChunkType::IDAT
            {
                self.idat_ended = true;
            }

            match header.chunk_type
            {
                PngChunkType::IHDR =>
                {
                    self.parse_ihdr(header)?;
                }
                PngChunkType::PLTE =>
                {
                    self.parse_plte(header)?;
                }
                PngChunkType::IDAT =>
                {
                    self.parse_idat(header)?;
                }
                PngChunkType::gAMA =>
                {
                    self.parse_gama(header)?;
                }
                PngChunkType::tIME =>
                {
                    self.parse_time(header)?;
                }
                PngChunkType::tEXt =>
                {
                    self.parse_text(header)?;
                }
                PngChunkType::zTXt =>
                {
                    self.parse_ztxt(header)?;
                }
                PngChunkType::iTXt =>
                {
                    self.parse_itxt(header)?;
                }
                PngChunkType::IEND =>
                {
                    if header.length != 0
                    {
                        return Err(PngErrors::InvalidStructure(
                            "IEND with a non zero length".to_string()
                        ));
                    }
                    self.stream.skip(4);
                    break;
                }
                PngChunkType::unkn =>
                {
                    self.handle_unknown_chunk(header)?;
                }
            }
        }
        self.seen_headers = true;
        Ok(())
    }

    /// Policy for chunks the decoder does not type: the case of
    /// the first letter says whether we may ignore it
    fn handle_unknown_chunk(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        if chunk.chunk[0] & (1 << 5) == 0
        {
            // critical chunk we know nothing about
            return Err(PngErrors::UnsupportedChunk(chunk.chunk));
        }
        let chunk_name = std::str::from_utf8(&chunk.chunk).unwrap_or("XXXX");

        trace!("Encountered unknown chunk {:?}", chunk_name);
        trace!("Length of chunk {}", chunk.length);
        trace!("Skipping {} bytes", chunk.length + 4);

        self.stream.skip(chunk.length + 4);

        Ok(())
    }

    /// Decode PNG encoded images and return the vector of raw
    /// pixels
    ///
    /// The resulting vec may be bigger or smaller than expected
    /// depending on the bit depth of the image.
    ///
    /// The endianness is big endian for 16 bit images represented as two u8 slices
    pub fn decode_raw(&mut self) -> Result<Vec<u8>, PngErrors>
    {
        // decode headers
        if !self.seen_headers
        {
            self.decode_headers()?;
        }

        info!("Colorspace: {:?}", self.get_colorspace().unwrap());

        if !self.seen_idat
        {
            return Err(PngErrors::InvalidStructure(
                "No IDAT chunk in stream".to_string()
            ));
        }
        if self.png_info.color == PngColor::Palette && self.palette.is_empty()
        {
            return Err(PngErrors::EmptyPalette);
        }

        // go parse IDAT chunks returning the inflate
        let deflate_data = self.inflate()?;

        // remove idat chunks from memory
        // we are already done with them.
        self.idat_chunks = Vec::new();

        let raw_rows = self.reconstruct_scanlines(&deflate_data)?;

        self.unpack_scanlines(raw_rows)
    }

    /// Decode PNG encoded images and return the vector of raw pixels but for 16-bit images
    /// represent them in a Vec<u16>
    ///
    /// This does one extra allocation when compared to `decode_raw` for 16 bit images to create the
    /// necessary representation of 16 bit images.
    pub fn decode(&mut self) -> Result<DecodingResult, PngErrors>
    {
        let out = self.decode_raw()?;

        if self.png_info.depth <= 8
        {
            return Ok(DecodingResult::U8(out));
        }
        if self.png_info.depth == 16
        {
            let new_array: Vec<u16> = out
                .chunks_exact(2)
                .map(|chunk| {
                    let value: [u8; 2] = chunk.try_into().unwrap();
                    u16::from_be_bytes(value)
                })
                .collect();

            return Ok(DecodingResult::U16(new_array));
        }
        Err(PngErrors::GenericStatic("Not implemented"))
    }

    /// Undo deflate decoding
    fn inflate(&mut self) -> Result<Vec<u8>, PngErrors>
    {
        // Deflate doesn't store its uncompressed size, so the
        // decompressor is handed a hint computed off the header
        // and a hard ceiling it may not cross.
        let info = self.png_info;
        let depth_scale = if info.depth == 16 { 2 } else { 1 };

        let size_hint =
            (info.width + 1) * info.height * depth_scale * usize::from(info.color.num_components());
        let limit = (size_hint + 4 * info.height).min(self.options.inflate_get_limit());

        let option = DeflateOptions::default()
            .set_size_hint(size_hint)
            .set_limit(limit)
            .set_confirm_checksum(self.options.inflate_get_confirm_adler());

        let mut decoder = quartz_inflate::DeflateDecoder::new_with_options(&self.idat_chunks, option);

        decoder.decode_zlib().map_err(PngErrors::ZlibDecodeErrors)
    }

    /// Reverse the scanline filters over the decompressed stream.
    ///
    /// Each scanline carries a leading filter type byte followed by
    /// `stride` filtered bytes, reconstruction is strictly top to
    /// bottom as every row needs the reconstructed row above it.
    ///
    /// Returns the packed image rows without the filter bytes.
    fn reconstruct_scanlines(&mut self, deflate_data: &[u8]) -> Result<Vec<u8>, PngErrors>
    {
        let info = self.png_info;
        let components = usize::from(info.color.num_components());
        let depth = usize::from(info.depth);

        // bytes per complete pixel, the distance filters reach
        // back by, never less than one byte
        let bpp = ((depth * components) / 8).max(1);
        // bytes per packed scanline
        let stride = (depth * components * info.width + 7) / 8;

        let expected = (stride + 1) * info.height;

        if deflate_data.len() < expected
        {
            return Err(PngErrors::Generic(format!(
                "Not enough pixel data, expected {} bytes but found {}",
                expected,
                deflate_data.len()
            )));
        }

        trace!("De-filtering {} scanlines, stride {}", info.height, stride);

        let mut out = vec![0_u8; stride * info.height];

        for (row, in_stride) in deflate_data
            .chunks_exact(stride + 1)
            .take(info.height)
            .enumerate()
        {
            // take filter
            let filter_byte = in_stride[0];
            // raw image bytes
            let raw = &in_stride[1..];

            let mut filter =
                FilterMethod::from_int(filter_byte).ok_or(PngErrors::InvalidFilter(filter_byte))?;

            if row == 0
            {
                // match our filters to special filters for the first
                // row, these do not need the previous scanline and
                // treat it as zero
                if filter == FilterMethod::Paeth
                {
                    filter = FilterMethod::PaethFirst;
                }
                if filter == FilterMethod::Up
                {
                    // up for the first row becomes a memcpy
                    filter = FilterMethod::None;
                }
                if filter == FilterMethod::Average
                {
                    filter = FilterMethod::AvgFirst;
                }
            }

            // Split output into rows already reconstructed and the
            // row we are writing to
            let (prev, current) = out.split_at_mut(row * stride);
            let current = &mut current[..stride];
            let prev_row = &prev[(row * stride).saturating_sub(stride)..];

            match filter
            {
                FilterMethod::None => current.copy_from_slice(raw),

                FilterMethod::Sub => handle_sub(raw, current, bpp),

                FilterMethod::Up => handle_up(prev_row, raw, current),

                FilterMethod::Average => handle_avg(prev_row, raw, current, bpp),

                FilterMethod::Paeth => handle_paeth(prev_row, raw, current, bpp),

                FilterMethod::PaethFirst => handle_paeth_first(raw, current, bpp),

                FilterMethod::AvgFirst => handle_avg_first(raw, current, bpp),

                FilterMethod::Unknown => unreachable!()
            }
        }
        Ok(out)
    }

    /// Turn packed reconstructed rows into the canonical sample
    /// array: one byte per sample below 16 bits, two big endian
    /// bytes per sample at 16, palette indices resolved to RGB
    fn unpack_scanlines(&mut self, raw_rows: Vec<u8>) -> Result<Vec<u8>, PngErrors>
    {
        let info = self.png_info;

        if info.depth >= 8
        {
            if info.color == PngColor::Palette
            {
                return self.expand_palette(&raw_rows);
            }
            // rows are already the output samples
            return Ok(raw_rows);
        }

        // sub-byte depths only occur with one component
        let stride = (usize::from(info.depth) * info.width + 7) / 8;

        let mut samples = vec![0_u8; info.width * info.height];

        // palette indices are left alone, the palette pass maps
        // them, grayscale intensities scale to the 8 bit domain
        let scale = if info.color == PngColor::Palette
        {
            1
        }
        else
        {
            DEPTH_SCALE_TABLE[usize::from(info.depth)]
        };

        for (in_row, out_row) in raw_rows
            .chunks_exact(stride)
            .zip(samples.chunks_exact_mut(info.width))
        {
            expand_bits_to_byte(info.depth, scale, in_row, out_row);
        }

        if info.color == PngColor::Palette
        {
            return self.expand_palette(&samples);
        }
        Ok(samples)
    }

    /// Resolve palette indices to their RGB triples
    fn expand_palette(&self, indices: &[u8]) -> Result<Vec<u8>, PngErrors>
    {
        let mut out = vec![0_u8; indices.len() * 3];

        for (px, index) in out.chunks_exact_mut(3).zip(indices)
        {
            match self.palette.get(usize::from(*index))
            {
                Some(entry) =>
                {
                    px[0] = entry.red;
                    px[1] = entry.green;
                    px[2] = entry.blue;
                }
                None =>
                {
                    return Err(PngErrors::InvalidPalette(format!(
                        "Palette index {} out of range, palette holds {} entries",
                        index,
                        self.palette.len()
                    )));
                }
            }
        }
        Ok(out)
    }
}

/// Scale factors taking an n bit sample to the 8 bit domain,
/// indexed by bit depth
const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];

/// Expand one packed row to a byte per sample.
///
/// Samples are packed MSB first, the leftmost pixel sits in the
/// high order bits of the first byte. Trailing bits of the last
/// byte are ignored when the width is not a multiple of the
/// samples per byte.
fn expand_bits_to_byte(depth: u8, scale: u8, input: &[u8], output: &mut [u8])
{
    let mut current = 0;
    let mut in_offset = 0;
    let mut k = output.len();

    if depth == 1
    {
        while k >= 8
        {
            let cur: &mut [u8; 8] = output
                .get_mut(current..current + 8)
                .unwrap()
                .try_into()
                .unwrap();

            let in_val = input[in_offset];

            cur[0] = scale * ((in_val >> 7) & 0x01);
            cur[1] = scale * ((in_val >> 6) & 0x01);
            cur[2] = scale * ((in_val >> 5) & 0x01);
            cur[3] = scale * ((in_val >> 4) & 0x01);
            cur[4] = scale * ((in_val >> 3) & 0x01);
            cur[5] = scale * ((in_val >> 2) & 0x01);
            cur[6] = scale * ((in_val >> 1) & 0x01);
            cur[7] = scale * (in_val & 0x01);

            in_offset += 1;
            current += 8;

            k -= 8;
        }
        if k > 0
        {
            let in_val = input[in_offset];

            for p in 0..k
            {
                let shift = (7_usize).wrapping_sub(p);
                output[current] = scale * ((in_val >> shift) & 0x01);
                current += 1;
            }
        }
    }
    else if depth == 2
    {
        while k >= 4
        {
            let cur: &mut [u8; 4] = output
                .get_mut(current..current + 4)
                .unwrap()
                .try_into()
                .unwrap();

            let in_val = input[in_offset];

            cur[0] = scale * ((in_val >> 6) & 0x03);
            cur[1] = scale * ((in_val >> 4) & 0x03);
            cur[2] = scale * ((in_val >> 2) & 0x03);
            cur[3] = scale * (in_val & 0x03);

            k -= 4;

            in_offset += 1;
            current += 4;
        }
        if k > 0
        {
            let in_val = input[in_offset];

            for p in 0..k
            {
                let shift = (6_usize).wrapping_sub(p * 2);
                output[current] = scale * ((in_val >> shift) & 0x03);
                current += 1;
            }
        }
    }
    else if depth == 4
    {
        while k >= 2
        {
            let cur: &mut [u8; 2] = output
                .get_mut(current..current + 2)
                .unwrap()
                .try_into()
                .unwrap();

            let in_val = input[in_offset];

            cur[0] = scale * ((in_val >> 4) & 0x0f);
            cur[1] = scale * (in_val & 0x0f);

            k -= 2;

            in_offset += 1;
            current += 2;
        }

        if k > 0
        {
            let in_val = input[in_offset];

            // leftovers
            output[current] = scale * ((in_val >> 4) & 0x0f);
        }
    }
}
