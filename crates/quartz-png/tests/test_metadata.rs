//! Tests for ancillary chunk parsing, text, time and gamma.

use quartz_inflate::adler32;
use quartz_png::PngDecoder;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

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

fn zlib_stored(data: &[u8]) -> Vec<u8>
{
    let mut out = vec![0x78, 0x01];
    let len = data.len() as u16;

    out.push(1);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

/// A 1x1 grayscale image with `middle` chunks between
/// IHDR and IDAT
fn png_with_chunks(middle: &[Vec<u8>]) -> Vec<u8>
{
    let mut out = PNG_SIGNATURE.to_vec();

    let mut ihdr_payload = Vec::new();

    ihdr_payload.extend_from_slice(&1_u32.to_be_bytes());
    ihdr_payload.extend_from_slice(&1_u32.to_be_bytes());
    ihdr_payload.extend_from_slice(&[8, 0, 0, 0, 0]);

    out.extend_from_slice(&chunk(b"IHDR", &ihdr_payload));
    for c in middle
    {
        out.extend_from_slice(c);
    }
    out.extend_from_slice(&chunk(b"IDAT", &zlib_stored(&[0, 0x42])));
    out.extend_from_slice(&chunk(b"IEND", &[]));
    out
}

#[test]
fn test_text_chunk()
{
    let png = png_with_chunks(&[chunk(b"tEXt", b"Title\0A png of a cat")]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let texts = decoder.get_text_chunks();

    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].keyword, "Title");
    assert_eq!(texts[0].text, "A png of a cat");
}

#[test]
fn test_text_chunk_latin1()
{
    // 0xE9 is e-acute in latin-1
    let png = png_with_chunks(&[chunk(b"tEXt", b"Author\0Ren\xE9")]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    assert_eq!(decoder.get_text_chunks()[0].text, "René");
}

#[test]
fn test_ztxt_chunk()
{
    let mut payload = b"Description\0\0".to_vec();

    payload.extend_from_slice(&zlib_stored(b"compressed commentary"));

    let png = png_with_chunks(&[chunk(b"zTXt", &payload)]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let ztxts = decoder.get_ztxt_chunks();

    assert_eq!(ztxts.len(), 1);
    assert_eq!(ztxts[0].keyword, "Description");
    assert_eq!(ztxts[0].text, "compressed commentary");
}

#[test]
fn test_itxt_chunk_uncompressed()
{
    // keyword, flag 0, method 0, language, translated keyword, text
    let payload = b"Comment\0\x00\x00en\0Kommentar\0hello world".to_vec();

    let png = png_with_chunks(&[chunk(b"iTXt", &payload)]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let itxts = decoder.get_itxt_chunks();

    assert_eq!(itxts.len(), 1);
    assert_eq!(itxts[0].keyword, "Comment");
    assert_eq!(itxts[0].language_tag, "en");
    assert_eq!(itxts[0].translated_keyword, "Kommentar");
    assert_eq!(itxts[0].text, "hello world");
}

#[test]
fn test_itxt_chunk_compressed()
{
    let mut payload = b"Comment\0\x01\x00fr\0\0".to_vec();

    payload.extend_from_slice(&zlib_stored("bonjour à tous".as_bytes()));

    let png = png_with_chunks(&[chunk(b"iTXt", &payload)]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let itxts = decoder.get_itxt_chunks();

    assert_eq!(itxts[0].language_tag, "fr");
    assert_eq!(itxts[0].text, "bonjour à tous");
}

#[test]
fn test_time_chunk()
{
    let mut payload = 2024_u16.to_be_bytes().to_vec();

    payload.extend_from_slice(&[6, 15, 13, 37, 59]);

    let png = png_with_chunks(&[chunk(b"tIME", &payload)]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let time = decoder.get_time().unwrap();

    assert_eq!(time.year, 2024);
    assert_eq!(time.month, 6);
    assert_eq!(time.day, 15);
    assert_eq!(time.hour, 13);
    assert_eq!(time.minute, 37);
    assert_eq!(time.second, 59);
}

#[test]
fn test_gamma_chunk()
{
    let png = png_with_chunks(&[chunk(b"gAMA", &45455_u32.to_be_bytes())]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    let gamma = decoder.get_gamma().unwrap();

    assert!((gamma - 0.45455).abs() < 1e-6);
}

#[test]
fn test_no_metadata_reports_none()
{
    let png = png_with_chunks(&[]);

    let mut decoder = PngDecoder::new(&png);

    decoder.decode_headers().unwrap();

    assert!(decoder.get_gamma().is_none());
    assert!(decoder.get_time().is_none());
    assert!(decoder.get_text_chunks().is_empty());

    // metadata parsing must not disturb pixel decoding
    assert_eq!(decoder.decode_raw().unwrap(), vec![0x42]);
}

#[test]
fn test_header_introspection()
{
    let png = png_with_chunks(&[]);

    let mut decoder = PngDecoder::new(&png);

    assert!(decoder.get_dimensions().is_none());

    decoder.decode_headers().unwrap();

    assert_eq!(decoder.get_dimensions(), Some((1, 1)));

    let info = decoder.get_info().unwrap();

    assert_eq!(info.width, 1);
    assert_eq!(info.height, 1);
    assert_eq!(info.depth, 8);
}
