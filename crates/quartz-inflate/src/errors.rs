use std::fmt::{Debug, Formatter};

/// A struct returned when decompression fails
pub struct InflateDecodeErrors
{
    /// reason why decompression fails
    pub error: DecodeErrorStatus,
    /// Data up until that decompression stage
    pub data:  Vec<u8>
}

impl InflateDecodeErrors
{
    /// Create a new decode wrapper with data being
    /// how many bytes we actually decoded before hitting an error
    pub fn new(error: DecodeErrorStatus, data: Vec<u8>) -> InflateDecodeErrors
    {
        InflateDecodeErrors { error, data }
    }
    /// Create a new decode wrapper with an empty vector
    pub fn new_with_error(error: DecodeErrorStatus) -> InflateDecodeErrors
    {
        InflateDecodeErrors::new(error, vec![])
    }
}

impl Debug for InflateDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self.error)
    }
}

pub enum DecodeErrorStatus
{
    /// The input ended before the stream was complete
    InsufficientData,
    Generic(&'static str),
    GenericStr(String),
    /// The zlib header (CMF/FLG pair) is not valid
    InvalidZlibHeader(&'static str),
    /// A deflate block is malformed
    InvalidBlock(&'static str),
    /// A code length description does not form a usable
    /// prefix code
    InvalidHuffman(&'static str),
    /// A match referenced data before the start of the output
    // (distance, bytes produced so far)
    InvalidDistance(usize, usize),
    /// Output would grow past the configured limit
    // (limit, requested)
    OutputLimitExceeded(usize, usize),
    /// The adler32 stored in the zlib trailer does not match
    /// the one computed over the output
    // (expected, computed)
    MismatchedAdler(u32, u32)
}

impl Debug for DecodeErrorStatus
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::InsufficientData => writeln!(f, "Insufficient data"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::GenericStr(reason) => writeln!(f, "{reason}"),
            Self::InvalidZlibHeader(reason) => writeln!(f, "Invalid zlib header: {reason}"),
            Self::InvalidBlock(reason) => writeln!(f, "Invalid deflate block: {reason}"),
            Self::InvalidHuffman(reason) => writeln!(f, "Invalid huffman code: {reason}"),
            Self::InvalidDistance(distance, available) => writeln!(
                f,
                "Invalid distance {distance}, only {available} bytes decoded so far"
            ),
            Self::OutputLimitExceeded(limit, current) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {current}"
            ),
            Self::MismatchedAdler(expected, found) =>
            {
                writeln!(f, "Mismatched Adler, expected {expected} but found {found}")
            }
        }
    }
}
