//! End to end decoding tests over synthesized png files.

use quartz_core::options::DecoderOptions;
use quartz_core::result::DecodingResult;
use quartz_inflate::adler32;
use quartz_png::error::PngErrors;
use quartz_png::PngDecoder;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Bitwise crc32, enough for building test files
fn crc32(data: &[u8]) -> u32
{
    let mut crc = u32::MAX;

    for byte in data
    {
        crc ^= u32::from(*byte);
        for _ in 0..8
        {
            crc = if crc & 1 == 1
            {
                0xEDB8_8320 ^ (crc >> 1)
            }
            else
            {
                crc >> 1
            };
        }
    }
    !crc
}

/// Serialize one chunk: length, type, payload, crc
fn chunk(name: &[u8; 4], payload: &[u8]) -> Vec<u8>
{
    let mut out = Vec::with_capacity(payload.len() + 12);

    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(payload);

    let mut checked = name.to_vec();
    checked.extend_from_slice(payload);

    out.extend_from_slice(&crc32(&checked).to_be_bytes());
    out
}

fn ihdr(width: u32, height: u32, depth: u8, color: u8) -> Vec<u8>
{
    ihdr_with_interlace(width, height, depth, color, 0)
}

fn ihdr_with_interlace(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8>
{
    let mut payload = Vec::new();

    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&[depth, color, 0, 0, interlace]);

    chunk(b"IHDR", &payload)
}

/// Wrap raw scanline data in a zlib stream of stored blocks
fn zlib_stored(data: &[u8]) -> Vec<u8>
{
    let mut out = vec![0x78, 0x01];

    if data.is_empty()
    {
        out.extend_from_slice(&[0x01, 0, 0, 0xFF, 0xFF]);
    }

    let blocks: Vec<&[u8]> = data.chunks(0xFFFF).collect();

    for (i, block) in blocks.iter().enumerate()
    {
        let is_final = i + 1 == blocks.len();
        let len = block.len() as u16;

        out.push(u8::from(is_final));
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(block);
    }

    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

/// A complete png with the given chunks between IHDR and IEND
fn build_png(header: Vec<u8>, middle: &[Vec<u8>]) -> Vec<u8>
{
    let mut out = PNG_SIGNATURE.to_vec();

    out.extend_from_slice(&header);
    for c in middle
    {
        out.extend_from_slice(c);
    }
    out.extend_from_slice(&chunk(b"IEND", &[]));
    out
}

/// The common case, one IDAT of stored blocks holding `scanlines`
fn simple_png(width: u32, height: u32, depth: u8, color: u8, scanlines: &[u8]) -> Vec<u8>
{
    build_png(
        ihdr(width, height, depth, color),
        &[chunk(b"IDAT", &zlib_stored(scanlines))]
    )
}

#[test]
fn test_signature_rejection()
{
    let error = PngDecoder::new(&[0; 8]).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::BadSignature));
}

#[test]
fn test_minimal_grayscale()
{
    let png = simple_png(1, 1, 8, 0, &[0, 0x42]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0x42]);
}

#[test]
fn test_flipped_iend_crc_rejected()
{
    let mut png = simple_png(1, 1, 8, 0, &[0, 0x42]);

    // corrupt one bit of the IEND crc, the trailing four bytes
    let len = png.len();
    png[len - 1] ^= 1;

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::BadCrc(_, _)));
}

#[test]
fn test_filter_reconstruction()
{
    // 2x2 grayscale, first row sub filtered, second row paeth
    let scanlines = [1, 10, 5, 4, 3, 7];
    let png = simple_png(2, 2, 8, 0, &scanlines);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![10, 15, 13, 22]);
}

#[test]
fn test_up_and_average_filters()
{
    // first row stored raw, second row up filtered,
    // third row average filtered
    let scanlines = [0, 10, 20, 2, 5, 5, 3, 4, 6];
    let png = simple_png(2, 3, 8, 0, &scanlines);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    // row 1: [10, 20]
    // row 2: [15, 25]
    // row 3: [4 + 15/2, 6 + (11 + 25)/2] = [11, 24]
    assert_eq!(pixels, vec![10, 20, 15, 25, 11, 24]);
}

#[test]
fn test_palette_resolution()
{
    let plte = chunk(b"PLTE", &[255, 0, 0, 0, 255, 0, 0, 0, 255]);
    let idat = chunk(b"IDAT", &zlib_stored(&[0, 0, 1, 2]));

    let png = build_png(ihdr(3, 1, 8, 3), &[plte, idat]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF]);
}

#[test]
fn test_sub_byte_unpack()
{
    // 1x4 grayscale at two bits per pixel, one packed byte
    // 0b11_10_01_00, leftmost pixel in the high bits.
    // Samples scale to the 8 bit domain by 0x55
    let png = simple_png(4, 1, 2, 0, &[0, 0xE4]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0xFF, 0xAA, 0x55, 0x00]);
}

#[test]
fn test_sub_byte_palette_indices_not_scaled()
{
    // 1x4 indexed at two bits per pixel, indices 3,2,1,0
    let plte = chunk(b"PLTE", &[10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40]);
    let idat = chunk(b"IDAT", &zlib_stored(&[0, 0xE4]));

    let png = build_png(ihdr(4, 1, 2, 3), &[plte, idat]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![40, 40, 40, 30, 30, 30, 20, 20, 20, 10, 10, 10]);
}

#[test]
fn test_sub_byte_row_with_trailing_bits()
{
    // width 3 at four bits per pixel, 1.5 bytes of samples
    // per row, the trailing nibble is padding
    let png = simple_png(3, 1, 4, 0, &[0, 0x12, 0x30]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0x11, 0x22, 0x33]);
}

#[test]
fn test_one_bit_grayscale()
{
    // 8x1, packed byte 0b1010_0001
    let png = simple_png(8, 1, 1, 0, &[0, 0b1010_0001]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![255, 0, 255, 0, 0, 0, 0, 255]);
}

#[test]
fn test_sixteen_bit_output_is_big_endian()
{
    let png = simple_png(1, 1, 16, 0, &[0, 0xAB, 0xCD]);

    let mut decoder = PngDecoder::new(&png);
    let pixels = decoder.decode_raw().unwrap();

    assert_eq!(pixels, vec![0xAB, 0xCD]);
}

#[test]
fn test_sixteen_bit_decode_to_u16()
{
    let png = simple_png(1, 1, 16, 0, &[0, 0xAB, 0xCD]);

    let result = PngDecoder::new(&png).decode().unwrap();

    match result
    {
        DecodingResult::U16(pixels) => assert_eq!(pixels, vec![0xABCD]),
        _ => panic!("expected sixteen bit output")
    }
}

#[test]
fn test_every_accepted_color_depth_pair()
{
    // (color type, bit depth, output channels)
    let matrix: &[(u8, u8, usize)] = &[
        (0, 1, 1),
        (0, 2, 1),
        (0, 4, 1),
        (0, 8, 1),
        (0, 16, 1),
        (2, 8, 3),
        (2, 16, 3),
        (3, 1, 3),
        (3, 2, 3),
        (3, 4, 3),
        (3, 8, 3),
        (4, 8, 2),
        (4, 16, 2),
        (6, 8, 4),
        (6, 16, 4)
    ];

    for &(color, depth, out_channels) in matrix
    {
        let in_channels = match color
        {
            0 | 3 => 1,
            2 => 3,
            4 => 2,
            _ => 4
        };
        let stride = (usize::from(depth) * in_channels + 7) / 8;

        let mut scanlines = vec![0_u8];
        scanlines.extend(std::iter::repeat(0).take(stride));

        let mut chunks = vec![];

        if color == 3
        {
            chunks.push(chunk(b"PLTE", &[1, 2, 3]));
        }
        chunks.push(chunk(b"IDAT", &zlib_stored(&scanlines)));

        let png = build_png(ihdr(1, 1, depth, color), &chunks);

        let pixels = PngDecoder::new(&png).decode_raw().unwrap_or_else(|e| {
            panic!("color {color} depth {depth} failed: {e:?}");
        });

        let sample_bytes = if depth == 16 { 2 } else { 1 };

        assert_eq!(
            pixels.len(),
            out_channels * sample_bytes,
            "color {color} depth {depth}"
        );
    }
}

#[test]
fn test_rejected_color_depth_pairs()
{
    for &(color, depth) in &[(2_u8, 2_u8), (2, 4), (4, 4), (6, 1), (3, 16), (0, 3), (7, 8)]
    {
        let png = simple_png(1, 1, depth, color, &[0, 0]);

        let error = PngDecoder::new(&png).decode_raw().unwrap_err();

        assert!(
            matches!(error, PngErrors::InvalidHeader(_)),
            "color {color} depth {depth} should be rejected, got {error:?}"
        );
    }
}

#[test]
fn test_interlaced_rejected()
{
    let png = build_png(
        ihdr_with_interlace(1, 1, 8, 0, 1),
        &[chunk(b"IDAT", &zlib_stored(&[0, 0]))]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidHeader(_)));
}

#[test]
fn test_zero_width_rejected()
{
    let png = simple_png(0, 1, 8, 0, &[]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidHeader(_)));
}

#[test]
fn test_multiple_idat_chunks_concatenate()
{
    // the zlib stream is split mid-block over two IDAT chunks
    let stream = zlib_stored(&[1, 10, 5, 4, 3, 7]);
    let (front, back) = stream.split_at(5);

    let png = build_png(
        ihdr(2, 2, 8, 0),
        &[chunk(b"IDAT", front), chunk(b"IDAT", back)]
    );

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![10, 15, 13, 22]);
}

#[test]
fn test_non_contiguous_idat_rejected()
{
    let stream = zlib_stored(&[0, 0x42]);
    let (front, back) = stream.split_at(5);

    let text = chunk(b"tEXt", b"Comment\0sneaky");

    let png = build_png(
        ihdr(1, 1, 8, 0),
        &[chunk(b"IDAT", front), text, chunk(b"IDAT", back)]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidStructure(_)));
}

#[test]
fn test_unknown_critical_chunk_rejected()
{
    let png = build_png(
        ihdr(1, 1, 8, 0),
        &[
            chunk(b"CrIt", &[1, 2, 3]),
            chunk(b"IDAT", &zlib_stored(&[0, 0x42]))
        ]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::UnsupportedChunk(_)));
}

#[test]
fn test_unknown_ancillary_chunk_skipped()
{
    let png = build_png(
        ihdr(1, 1, 8, 0),
        &[
            chunk(b"anCi", &[1, 2, 3]),
            chunk(b"IDAT", &zlib_stored(&[0, 0x42]))
        ]
    );

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0x42]);
}

#[test]
fn test_missing_palette_rejected()
{
    let png = simple_png(1, 1, 8, 3, &[0, 0]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::EmptyPalette));
}

#[test]
fn test_palette_for_grayscale_rejected()
{
    let png = build_png(
        ihdr(1, 1, 8, 0),
        &[
            chunk(b"PLTE", &[1, 2, 3]),
            chunk(b"IDAT", &zlib_stored(&[0, 0]))
        ]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidPalette(_)));
}

#[test]
fn test_suggested_palette_for_truecolor_ignored()
{
    let png = build_png(
        ihdr(1, 1, 8, 2),
        &[
            chunk(b"PLTE", &[9, 9, 9]),
            chunk(b"IDAT", &zlib_stored(&[0, 1, 2, 3]))
        ]
    );

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![1, 2, 3]);
}

#[test]
fn test_palette_index_out_of_range_rejected()
{
    let plte = chunk(b"PLTE", &[255, 0, 0, 0, 255, 0]);
    let idat = chunk(b"IDAT", &zlib_stored(&[0, 2]));

    let png = build_png(ihdr(1, 1, 8, 3), &[plte, idat]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidPalette(_)));
}

#[test]
fn test_oversized_palette_rejected()
{
    // three entries is too many for a one bit image
    let plte = chunk(b"PLTE", &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    let idat = chunk(b"IDAT", &zlib_stored(&[0, 0]));

    let png = build_png(ihdr(1, 1, 1, 3), &[plte, idat]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidPalette(_)));
}

#[test]
fn test_invalid_filter_type_rejected()
{
    let png = simple_png(1, 1, 8, 0, &[5, 0x42]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidFilter(5)));
}

#[test]
fn test_adler_mismatch_rejected()
{
    let mut stream = zlib_stored(&[0, 0x42]);

    let len = stream.len();
    stream[len - 1] ^= 0xFF;

    let png = build_png(ihdr(1, 1, 8, 0), &[chunk(b"IDAT", &stream)]);

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::ZlibDecodeErrors(_)));
}

#[test]
fn test_truncated_stream_rejected()
{
    let png = simple_png(1, 1, 8, 0, &[0, 0x42]);

    let error = PngDecoder::new(&png[..png.len() - 6])
        .decode_raw()
        .unwrap_err();

    assert!(matches!(error, PngErrors::TruncatedStream(_, _)));
}

#[test]
fn test_duplicate_gama_rejected()
{
    let gama = chunk(b"gAMA", &45455_u32.to_be_bytes());

    let png = build_png(
        ihdr(1, 1, 8, 0),
        &[
            gama.clone(),
            gama,
            chunk(b"IDAT", &zlib_stored(&[0, 0x42]))
        ]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidStructure(_)));
}

#[test]
fn test_trailing_bytes_after_iend_ignored()
{
    let mut png = simple_png(1, 1, 8, 0, &[0, 0x42]);

    png.extend_from_slice(b"trailing garbage");

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0x42]);
}

#[test]
fn test_fast_options_skip_checksums()
{
    let mut png = simple_png(1, 1, 8, 0, &[0, 0x42]);

    // corrupt the IEND crc, fast options never look at it
    let len = png.len();
    png[len - 1] ^= 1;

    let pixels = PngDecoder::new_with_options(&png, DecoderOptions::new_fast())
        .decode_raw()
        .unwrap();

    assert_eq!(pixels, vec![0x42]);
}

#[test]
fn test_max_dimensions_enforced()
{
    let png = simple_png(4, 1, 2, 0, &[0, 0xE4]);

    let options = DecoderOptions::default().set_max_width(2);

    let error = PngDecoder::new_with_options(&png, options)
        .decode_raw()
        .unwrap_err();

    assert!(matches!(error, PngErrors::InvalidHeader(_)));
}

#[test]
fn test_plte_after_idat_rejected()
{
    let png = build_png(
        ihdr(1, 1, 8, 2),
        &[
            chunk(b"IDAT", &zlib_stored(&[0, 1, 2, 3])),
            chunk(b"PLTE", &[9, 9, 9])
        ]
    );

    let error = PngDecoder::new(&png).decode_raw().unwrap_err();

    assert!(matches!(error, PngErrors::InvalidStructure(_)));
}

#[test]
fn test_fixed_huffman_idat()
{
    // a hand assembled fixed huffman block holding the
    // scanline [0, 0] of a 1x1 grayscale image
    let mut bits: Vec<u8> = vec![];
    let mut nbits = 0_usize;

    let push_bit = |bits: &mut Vec<u8>, nbits: &mut usize, bit: u8| {
        if *nbits / 8 == bits.len()
        {
            bits.push(0);
        }
        bits[*nbits / 8] |= bit << (*nbits % 8);
        *nbits += 1;
    };

    // BFINAL = 1, BTYPE = 01
    push_bit(&mut bits, &mut nbits, 1);
    push_bit(&mut bits, &mut nbits, 1);
    push_bit(&mut bits, &mut nbits, 0);

    // literal 0 twice: codeword 0x30, eight bits MSB first,
    // then the seven zero bits of the end of block code
    for code_bits in [8_u8, 8, 7]
    {
        let code = if code_bits == 8 { 0x30_u32 } else { 0 };

        for i in (0..code_bits).rev()
        {
            push_bit(&mut bits, &mut nbits, ((code >> i) & 1) as u8);
        }
    }

    let mut stream = vec![0x78, 0x01];
    stream.extend_from_slice(&bits);
    stream.extend_from_slice(&adler32(&[0, 0]).to_be_bytes());

    let png = build_png(ihdr(1, 1, 8, 0), &[chunk(b"IDAT", &stream)]);

    let pixels = PngDecoder::new(&png).decode_raw().unwrap();

    assert_eq!(pixels, vec![0]);
}
