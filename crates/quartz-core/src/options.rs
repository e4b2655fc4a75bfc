/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global decoder options

fn decoder_strict_mode() -> DecoderFlags
{
    DecoderFlags {
        inflate_confirm_adler: true,
        png_confirm_crc:       true,
        strict_mode:           true
    }
}

/// Fast decoder options
///
/// Disables png adler and crc checking.
fn fast_options() -> DecoderFlags
{
    DecoderFlags {
        inflate_confirm_adler: false,
        png_confirm_crc:       false,
        strict_mode:           false
    }
}

/// Decoder options that are flags
///
/// NOTE: When you extend this, add true or false to
/// all options above that return a `DecoderFlags`
#[derive(Copy, Debug, Clone, Default)]
pub struct DecoderFlags
{
    /// Whether the inflate decoder should confirm and report adler mismatch
    inflate_confirm_adler: bool,
    /// Whether the PNG decoder should confirm crc
    png_confirm_crc:       bool,
    /// Whether decoders should error out on recoverable non-conformance
    strict_mode:           bool
}

/// Decoder options
///
/// Not all options are respected by all decoders
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions
{
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    max_width:     usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    max_height:    usize,
    /// Maximum size for inflate output.
    /// Respected by all decoders that use inflate
    deflate_limit: usize,
    /// Boolean flags that influence decoding
    flags:         DecoderFlags
}

/// Initializers
impl DecoderOptions
{
    /// Create the decoder with options setting most configurable
    /// options to be their safe counterparts
    ///
    /// This is the same as the `default` option as default initializes
    /// options to the safe variant.
    pub fn new_safe() -> DecoderOptions
    {
        DecoderOptions::default()
    }

    /// Create the decoder options with the following characteristics
    ///
    /// - Ignore error checksumming, e.g in png we do not confirm adler and crc
    ///   in this mode
    pub fn new_fast() -> DecoderOptions
    {
        let flag = fast_options();
        DecoderOptions::default().set_decoder_flags(flag)
    }
}

/// Global options respected by all decoders
impl DecoderOptions
{
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize
    {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize
    {
        self.max_height
    }

    /// Return true whether the decoder should be in strict mode
    /// and reject most errors
    pub const fn get_strict_mode(&self) -> bool
    {
        self.flags.strict_mode
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    pub fn set_max_width(mut self, width: usize) -> Self
    {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    pub fn set_max_height(mut self, height: usize) -> Self
    {
        self.max_height = height;
        self
    }

    fn set_decoder_flags(mut self, flags: DecoderFlags) -> Self
    {
        self.flags = flags;
        self
    }

    /// Set whether the decoder should be in standards conforming/
    /// strict mode
    ///
    /// This reduces the error tolerance level for the decoders and invalid
    /// samples will be rejected by the decoder
    pub fn set_strict_mode(mut self, yes: bool) -> Self
    {
        self.flags.strict_mode = yes;
        self.flags.png_confirm_crc = yes;
        self.flags.inflate_confirm_adler = yes;
        self
    }
}

/// PNG specific options
impl DecoderOptions
{
    /// Whether the inflate decoder should confirm
    /// adler checksums
    pub const fn inflate_get_confirm_adler(&self) -> bool
    {
        self.flags.inflate_confirm_adler
    }
    /// Set whether the inflate decoder should confirm
    /// adler checksums
    pub fn inflate_set_confirm_adler(mut self, yes: bool) -> Self
    {
        self.flags.inflate_confirm_adler = yes;
        self
    }
    /// Get default inflate limit for which the decoder
    /// will not try to decompress further
    pub const fn inflate_get_limit(&self) -> usize
    {
        self.deflate_limit
    }
    /// Set the default inflate limit for which decompressors
    /// relying on inflate won't surpass this limit
    #[must_use]
    pub fn inflate_set_limit(mut self, limit: usize) -> Self
    {
        self.deflate_limit = limit;
        self
    }
    /// Whether the png decoder should confirm
    /// crc 32 checksums
    pub const fn png_get_confirm_crc(&self) -> bool
    {
        self.flags.png_confirm_crc
    }
    /// Set whether the png decoder should confirm
    /// CRC 32 checksums
    #[must_use]
    pub fn png_set_confirm_crc(mut self, yes: bool) -> Self
    {
        self.flags.png_confirm_crc = yes;
        self
    }
}

impl Default for DecoderOptions
{
    fn default() -> Self
    {
        Self {
            max_width:     1 << 14,
            max_height:    1 << 14,
            deflate_limit: 1 << 30,
            flags:         decoder_strict_mode()
        }
    }
}
