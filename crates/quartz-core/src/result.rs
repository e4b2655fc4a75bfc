//! Decoding results for images with different bit depths

/// A simple enum that can hold decode
/// results of most images
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodingResult
{
    U8(Vec<u8>),
    U16(Vec<u16>)
}

impl DecodingResult
{
    /// Return the contained vector if the result is
    /// of type [`DecodingResult::U8`] or `None` otherwise
    pub fn u8(self) -> Option<Vec<u8>>
    {
        match self
        {
            DecodingResult::U8(data) => Some(data),
            _ => None
        }
    }

    /// Return the contained vector if the result is
    /// of type [`DecodingResult::U16`] or `None` otherwise
    pub fn u16(self) -> Option<Vec<u16>>
    {
        match self
        {
            DecodingResult::U16(data) => Some(data),
            _ => None
        }
    }
}
