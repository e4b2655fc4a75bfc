/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by all libraries
//!
//! This crate provides a set of core routines shared
//! by the decoders under the `quartz` umbrella
//!
//! It currently contains
//!
//! - A bytestream reader with endian aware reads
//! - Colorspace and bit depth information shared by images
//! - Image decoder options
//! - A simple enum type to hold image decoding results.

pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod options;
pub mod result;
