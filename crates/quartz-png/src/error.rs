use std::fmt::{Debug, Formatter};

use quartz_core::bytestream::ZByteIoError;
use quartz_inflate::errors::InflateDecodeErrors;

pub enum PngErrors
{
    /// The first eight bytes are not the png signature
    BadSignature,
    /// The stream ended before a declared length was satisfied
    // (requested, remaining)
    TruncatedStream(usize, usize),
    /// An IHDR field is outside the accepted values
    InvalidHeader(String),
    /// Chunks are present but in an order or multiplicity
    /// the format forbids
    InvalidStructure(String),
    /// A chunk crc did not match the one computed over
    /// its type and payload
    // (expected, computed)
    BadCrc(u32, u32),
    /// An unknown chunk marked critical
    UnsupportedChunk([u8; 4]),
    /// A filter type byte outside 0..=4
    InvalidFilter(u8),
    /// Palette missing, misplaced, malformed or indexed
    /// out of range
    InvalidPalette(String),
    EmptyPalette,
    /// The inflate step failed, zlib framing included
    ZlibDecodeErrors(InflateDecodeErrors),
    GenericStatic(&'static str),
    Generic(String)
}

impl Debug for PngErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::TruncatedStream(requested, remaining) => writeln!(
                f,
                "Truncated stream, requested {requested} bytes but only {remaining} remain"
            ),
            Self::InvalidHeader(reason) => writeln!(f, "Invalid IHDR: {reason}"),
            Self::InvalidStructure(reason) => writeln!(f, "Invalid chunk structure: {reason}"),
            Self::BadCrc(expected, found) => writeln!(
                f,
                "Mismatched CRC, stored {expected:08X} but computed {found:08X}"
            ),
            Self::UnsupportedChunk(chunk) =>
            {
                let name = std::str::from_utf8(chunk).unwrap_or("XXXX");
                writeln!(f, "Unknown critical chunk {name}, cannot continue")
            }
            Self::InvalidFilter(filter) => writeln!(f, "Unknown filter type {filter}"),
            Self::InvalidPalette(reason) => writeln!(f, "Invalid palette: {reason}"),
            Self::EmptyPalette => writeln!(f, "Palette chunk is missing or empty"),
            Self::ZlibDecodeErrors(err) => writeln!(f, "Error decoding idat stream: {err:?}"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}")
        }
    }
}

impl From<&'static str> for PngErrors
{
    fn from(val: &'static str) -> Self
    {
        Self::GenericStatic(val)
    }
}

impl From<String> for PngErrors
{
    fn from(val: String) -> Self
    {
        Self::Generic(val)
    }
}

impl From<InflateDecodeErrors> for PngErrors
{
    fn from(val: InflateDecodeErrors) -> Self
    {
        Self::ZlibDecodeErrors(val)
    }
}

impl From<ZByteIoError> for PngErrors
{
    fn from(val: ZByteIoError) -> Self
    {
        match val
        {
            ZByteIoError::NotEnoughBytes(requested, remaining) =>
            {
                Self::TruncatedStream(requested, remaining)
            }
            ZByteIoError::Generic(reason) => Self::GenericStatic(reason)
        }
    }
}
