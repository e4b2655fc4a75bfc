//! A png decoder
//!
//! This features a simple PNG reader in Rust which supports decoding of valid
//! ISO/IEC 15948:2003 (E) PNG images
//!
//!
//! # Features
//! - Inflate decoder with full dynamic huffman support
//! - Chunk and stream checksum verification, CRC-32 and Adler-32
//! - Ancillary text, time and gamma chunks parsed to typed records
//!
//! # Usage
//! Add the library to `Cargo.toml`
//!
//! ```toml
//! quartz_png="0.1"
//! ```
//!
//! #### Decode to raw bytes.
//!
//! This is a simple decode operation which returns raw
//! bytes of the image.
//!
//! - **Note**: For 16 bit depth images each two bytes
//! represent a single pixel in big endian. So one should
//! inspect `PngDecoder::get_depth` to get the bit depth
//! of the image in order to understand the raw bytes layout.
//!
//! A more convenient API is given below, using `decode`
//!
//!```no_run
//! use quartz_png::PngDecoder;
//! let mut decoder = PngDecoder::new(&[]);
//!
//! let pixels = decoder.decode_raw();
//! ```
//!
//! # Decode to u8 or u16 depending on depth
//!
//! From the above limitation, there are needs to treat result
//! types differently depending on the image's bit depth.
//!
//! That's what the `decode` api for the PngDecoder does.
//!
//!```no_run
//! use quartz_png::PngDecoder;
//! use quartz_core::result::DecodingResult;
//! let mut decoder = PngDecoder::new(&[]);
//!
//! let pixels = decoder.decode().unwrap();
//!
//! match pixels {
//!    DecodingResult::U8(px)=>{
//!        // do something with images with 8 bit depths
//!    }
//!    DecodingResult::U16(px)=>{
//!        // do something with images with 16 bit depths
//!    }
//!    _=>unreachable!(),
//!}
//!```
//!
//! # Extracting metadata
//!
//! Once headers have been decoded, image metadata can be accessed via the
//! [`get_info()`](PngDecoder::get_info), [`get_gamma()`](PngDecoder::get_gamma),
//! [`get_time()`](PngDecoder::get_time) and the text chunk accessors.
//!
pub use decoder::{ItxtChunk, PngDecoder, PngInfo, TextChunk, TimeInfo, ZtxtChunk};
pub use enums::InterlaceMethod;
pub use quartz_core;

mod constants;
mod crc;
mod decoder;
mod enums;
pub mod error;
mod filters;
mod headers;
