//! A byte reader over in-memory buffers with endian aware reads.

use std::fmt::{Debug, Formatter};

/// Errors that may occur when reading from the stream
pub enum ZByteIoError
{
    /// Not enough bytes to satisfy a read
    // requested, remaining
    NotEnoughBytes(usize, usize),
    /// An error that may occur randomly
    Generic(&'static str)
}

impl Debug for ZByteIoError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            ZByteIoError::NotEnoughBytes(requested, remaining) =>
            {
                writeln!(
                    f,
                    "Not enough bytes, requested {requested} but only {remaining} remain"
                )
            }
            ZByteIoError::Generic(err) =>
            {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

/// An encapsulation of a borrowed byte stream
///
/// This provides endian aware reads over an in-memory
/// buffer, with both fallible variants returning
/// [`ZByteIoError`] and infallible variants returning `0`
/// when the stream is exhausted.
pub struct ZByteReader<'a>
{
    /// Data stream
    stream:   &'a [u8],
    position: usize
}

enum Mode
{
    // Big endian
    BE,
    // Little Endian
    LE
}

impl<'a> ZByteReader<'a>
{
    /// Create a new reader from a byte buffer
    pub const fn new(buf: &'a [u8]) -> ZByteReader<'a>
    {
        ZByteReader {
            stream:   buf,
            position: 0
        }
    }
    /// Skip `num` bytes ahead of the stream.
    pub fn skip(&mut self, num: usize)
    {
        // Can this overflow ??
        self.position = self.position.wrapping_add(num);
    }
    /// Undo a skip.
    pub fn rewind(&mut self, num: usize)
    {
        self.position = self.position.wrapping_sub(num);
    }

    /// Return true if the underlying buffer stream is empty
    pub const fn eof(&self) -> bool
    {
        self.position >= self.stream.len()
    }
    /// Return the number of bytes remaining in the stream
    pub const fn remaining(&self) -> usize
    {
        self.stream.len().saturating_sub(self.position)
    }
    /// Return true if the stream has at least `num` bytes left
    pub const fn has(&self, num: usize) -> bool
    {
        self.remaining() >= num
    }
    /// Get current position of the stream
    pub const fn get_position(&self) -> usize
    {
        self.position
    }

    /// Look ahead `position` bytes from the current location
    /// and return a reference to `num_bytes` from that position,
    /// without advancing the stream.
    pub fn peek_at(&self, position: usize, num_bytes: usize) -> Result<&'a [u8], ZByteIoError>
    {
        let start = self.position.wrapping_add(position);
        let end = start.wrapping_add(num_bytes);

        match self.stream.get(start..end)
        {
            Some(bytes) => Ok(bytes),
            None => Err(ZByteIoError::NotEnoughBytes(num_bytes, self.remaining()))
        }
    }

    /// Get a reference to `num` bytes from the stream,
    /// advancing the position past them.
    pub fn get_as_ref(&mut self, num: usize) -> Result<&'a [u8], ZByteIoError>
    {
        match self.stream.get(self.position..self.position + num)
        {
            Some(bytes) =>
            {
                self.position += num;
                Ok(bytes)
            }
            None => Err(ZByteIoError::NotEnoughBytes(num, self.remaining()))
        }
    }

    /// Get a single byte from the stream, returning 0
    /// if the stream is exhausted
    pub fn get_u8(&mut self) -> u8
    {
        let byte = *self.stream.get(self.position).unwrap_or(&0);

        self.position += 1;

        byte
    }
    /// Get a single byte from the stream, returning an error
    /// if the stream is exhausted
    pub fn get_u8_err(&mut self) -> Result<u8, ZByteIoError>
    {
        match self.stream.get(self.position)
        {
            Some(byte) =>
            {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(ZByteIoError::NotEnoughBytes(1, 0))
        }
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$name6:tt,$int_type:tt) => {
        impl<'a> ZByteReader<'a>
        {
            #[inline(always)]
            fn $name(&mut self, mode: Mode) -> $int_type
            {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                if let Some(bytes) = self.stream.get(self.position..self.position + SIZE_OF_VAL)
                {
                    space.copy_from_slice(bytes);
                }
                self.position += SIZE_OF_VAL;

                match mode
                {
                    Mode::BE => $int_type::from_be_bytes(space),
                    Mode::LE => $int_type::from_le_bytes(space)
                }
            }

            #[inline(always)]
            fn $name2(&mut self, mode: Mode) -> Result<$int_type, ZByteIoError>
            {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                match self.stream.get(self.position..self.position + SIZE_OF_VAL)
                {
                    Some(bytes) =>
                    {
                        let mut space = [0; SIZE_OF_VAL];

                        space.copy_from_slice(bytes);
                        self.position += SIZE_OF_VAL;

                        match mode
                        {
                            Mode::BE => Ok($int_type::from_be_bytes(space)),
                            Mode::LE => Ok($int_type::from_le_bytes(space))
                        }
                    }
                    None => Err(ZByteIoError::NotEnoughBytes(
                        SIZE_OF_VAL,
                        self.remaining()
                    ))
                }
            }
            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name3(&mut self) -> Result<$int_type, ZByteIoError>
            {
                self.$name2(Mode::BE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name4(&mut self) -> Result<$int_type, ZByteIoError>
            {
                self.$name2(Mode::LE)
            }
            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning 0 if the underlying buffer does not have enough bytes for a ",stringify!($int_type)," read.")]
            #[inline(always)]
            pub fn $name5(&mut self) -> $int_type
            {
                self.$name(Mode::BE)
            }
            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning 0 if the underlying buffer does not have enough bytes for a ",stringify!($int_type)," read.")]
            #[inline(always)]
            pub fn $name6(&mut self) -> $int_type
            {
                self.$name(Mode::LE)
            }
        }
    };
}

get_single_type!(
    get_u16_inner_or_default,
    get_u16_inner_or_die,
    get_u16_be_err,
    get_u16_le_err,
    get_u16_be,
    get_u16_le,
    u16
);
get_single_type!(
    get_u32_inner_or_default,
    get_u32_inner_or_die,
    get_u32_be_err,
    get_u32_le_err,
    get_u32_be,
    get_u32_le,
    u32
);
get_single_type!(
    get_u64_inner_or_default,
    get_u64_inner_or_die,
    get_u64_be_err,
    get_u64_le_err,
    get_u64_be,
    get_u64_le,
    u64
);
