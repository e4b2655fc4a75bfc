//! A deflate decoder.
//!
//! This crate features a deflate/zlib decoder with the
//! smaller scope of serving the decoders in the `quartz`
//! family of crates.
//!
//! Use it if
//! - You want a small library footprint
//! - You want a 100% safe, pure rust implementation
//!
//!
//! # Usage
//!
//! Decoding deflate data
//!
//! ```no_run
//! use quartz_inflate::DeflateDecoder;
//! let totally_valid_data = [0;23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode_deflate();
//! ```
//!
//! Decoding zlib data
//! ```no_run
//! use quartz_inflate::DeflateDecoder;
//! let totally_valid_data = [0;23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode_zlib();
//! ```
//!
//! Decoding zlib data without confirming the adler32 checksum
//! ```no_run
//! use quartz_inflate::DeflateDecoder;
//! use quartz_inflate::DeflateOptions;
//! let totally_valid_data = [0;23];
//! let mut options = DeflateOptions::default()
//!                     .set_confirm_checksum(false);
//! let decoder = DeflateDecoder::new_with_options(&totally_valid_data, options);
//!
//! ```
pub use crate::adler::{adler32, Adler32};
pub use crate::decoder::{DeflateDecoder, DeflateOptions};

mod adler;
mod bitstream;
mod constants;
mod decoder;
pub mod errors;
mod huffman;
