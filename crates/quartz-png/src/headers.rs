use log::info;

use crate::decoder::{ItxtChunk, PLTEEntry, PngChunk, TextChunk, TimeInfo, ZtxtChunk};
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::PngErrors;
use crate::PngDecoder;

impl<'a> PngDecoder<'a>
{
    pub(crate) fn parse_ihdr(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        if self.seen_hdr
        {
            return Err(PngErrors::InvalidStructure(
                "Multiple IHDR, corrupt PNG".to_string()
            ));
        }

        if chunk.length != 13
        {
            return Err(PngErrors::InvalidHeader("Bad IHDR length".to_string()));
        }

        let pos_start = self.stream.get_position();

        self.png_info.width = self.stream.get_u32_be() as usize;
        self.png_info.height = self.stream.get_u32_be() as usize;

        if self.png_info.width == 0 || self.png_info.height == 0
        {
            return Err(PngErrors::InvalidHeader(
                "Width or height cannot be zero".to_string()
            ));
        }

        if self.png_info.width > self.options.get_max_width()
        {
            return Err(PngErrors::InvalidHeader(format!(
                "Image width {}, larger than maximum configured width {}, aborting",
                self.png_info.width,
                self.options.get_max_width()
            )));
        }

        if self.png_info.height > self.options.get_max_height()
        {
            return Err(PngErrors::InvalidHeader(format!(
                "Image height {}, larger than maximum configured height {}, aborting",
                self.png_info.height,
                self.options.get_max_height()
            )));
        }

        self.png_info.depth = self.stream.get_u8();
        let color = self.stream.get_u8();

        if let Some(img_color) = PngColor::from_int(color)
        {
            self.png_info.color = img_color;
        }
        else
        {
            return Err(PngErrors::InvalidHeader(format!(
                "Unknown color value {color}"
            )));
        }
        self.png_info.component = self.png_info.color.num_components();

        // verify colors plus bit depths
        match self.png_info.depth
        {
            1 | 2 | 4 =>
            {
                if !matches!(self.png_info.color, PngColor::Luma | PngColor::Palette)
                {
                    let err_msg = format!(
                        "Bit depth of {} only allows grayscale or indexed color types, but found {:?}",
                        self.png_info.depth, self.png_info.color
                    );

                    return Err(PngErrors::InvalidHeader(err_msg));
                }
            }
            8 =>
            { /* silent pass through since all color types support it */ }
            16 =>
            {
                if self.png_info.color == PngColor::Palette
                {
                    return Err(PngErrors::InvalidHeader(
                        "Indexed colour cannot have 16 bit depth".to_string()
                    ));
                }
            }
            _ =>
            {
                return Err(PngErrors::InvalidHeader(format!(
                    "Unknown bit depth {}",
                    self.png_info.depth
                )))
            }
        }

        if self.stream.get_u8() != 0
        {
            return Err(PngErrors::InvalidHeader(
                "Unknown compression method".to_string()
            ));
        }

        let filter_method = self.stream.get_u8();

        if filter_method != 0
        {
            return Err(PngErrors::InvalidHeader(format!(
                "Unknown filter method {filter_method}"
            )));
        }

        let interlace_method = self.stream.get_u8();

        match InterlaceMethod::from_int(interlace_method)
        {
            Some(InterlaceMethod::Standard) =>
            {
                self.png_info.interlace_method = InterlaceMethod::Standard;
            }
            Some(InterlaceMethod::Adam7) =>
            {
                return Err(PngErrors::InvalidHeader(
                    "Adam7 interlaced images are not supported".to_string()
                ));
            }
            _ =>
            {
                return Err(PngErrors::InvalidHeader(format!(
                    "Unknown interlace method {interlace_method}"
                )));
            }
        }

        let pos_end = self.stream.get_position();

        assert_eq!(pos_end - pos_start, 13); // we read all bytes

        // skip crc
        self.stream.skip(4);

        info!("Width: {}", self.png_info.width);
        info!("Height: {}", self.png_info.height);
        info!("Color type: {:?}", self.png_info.color);
        info!("Depth: {:?}", self.png_info.depth);
        info!("Interlace: {:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_plte(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        if self.seen_ptle
        {
            return Err(PngErrors::InvalidStructure(
                "Multiple PLTE chunks, corrupt PNG".to_string()
            ));
        }
        if self.seen_idat
        {
            return Err(PngErrors::InvalidStructure(
                "PLTE chunk after IDAT, corrupt PNG".to_string()
            ));
        }
        if matches!(self.png_info.color, PngColor::Luma | PngColor::LumaA)
        {
            return Err(PngErrors::InvalidPalette(format!(
                "PLTE chunk shall not appear for colour type {:?}",
                self.png_info.color
            )));
        }

        if chunk.length % 3 != 0
        {
            return Err(PngErrors::InvalidPalette(
                "PLTE length not a multiple of three".to_string()
            ));
        }

        let count = chunk.length / 3;

        if count == 0
        {
            return Err(PngErrors::InvalidPalette(
                "PLTE chunk with no entries".to_string()
            ));
        }
        if count > 256 || count > (1 << self.png_info.depth)
        {
            return Err(PngErrors::InvalidPalette(format!(
                "PLTE holds {} entries, too many for a bit depth of {}",
                count, self.png_info.depth
            )));
        }

        self.palette.resize(count, PLTEEntry::default());

        for pal_entry in &mut self.palette
        {
            pal_entry.red = self.stream.get_u8();
            pal_entry.green = self.stream.get_u8();
            pal_entry.blue = self.stream.get_u8();
        }

        // skip crc chunk
        self.stream.skip(4);
        self.seen_ptle = true;
        Ok(())
    }

    pub(crate) fn parse_idat(&mut self, png_chunk: PngChunk) -> Result<(), PngErrors>
    {
        if self.idat_ended
        {
            return Err(PngErrors::InvalidStructure(
                "Non contiguous IDAT chunks, corrupt PNG".to_string()
            ));
        }

        // get a reference to the IDAT chunk stream and push it,
        // we will later pass these to the deflate decoder as a whole, to get the whole
        // uncompressed stream.
        let idat_stream = self.stream.get_as_ref(png_chunk.length)?;

        self.idat_chunks.extend_from_slice(idat_stream);

        // skip crc
        self.stream.skip(4);

        self.seen_idat = true;

        Ok(())
    }

    pub(crate) fn parse_gama(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        if self.seen_gamma
        {
            return Err(PngErrors::InvalidStructure(
                "Multiple gAMA chunks, corrupt PNG".to_string()
            ));
        }
        if self.options.get_strict_mode() && chunk.length != 4
        {
            let error = format!("Gama chunk length is not 4 but {}", chunk.length);
            return Err(PngErrors::Generic(error));
        }

        // stored as the gamma value times one hundred thousand
        self.gama = self.stream.get_u32_be() as f32 / 100_000.0;
        self.seen_gamma = true;

        // skip crc
        self.stream.skip(4);

        Ok(())
    }

    pub(crate) fn parse_time(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        if self.time_info.is_some()
        {
            return Err(PngErrors::InvalidStructure(
                "Multiple tIME chunks, corrupt PNG".to_string()
            ));
        }
        if chunk.length != 7
        {
            return Err(PngErrors::Generic(format!(
                "tIME chunk length is not 7 but {}",
                chunk.length
            )));
        }

        let time = TimeInfo {
            year:   self.stream.get_u16_be(),
            month:  self.stream.get_u8(),
            day:    self.stream.get_u8(),
            hour:   self.stream.get_u8(),
            minute: self.stream.get_u8(),
            second: self.stream.get_u8()
        };

        self.time_info = Some(time);

        // skip crc
        self.stream.skip(4);

        Ok(())
    }

    pub(crate) fn parse_text(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        let payload = self.stream.get_as_ref(chunk.length)?;

        let (keyword, text) = split_keyword(payload)?;

        self.text_chunks.push(TextChunk {
            keyword: latin1_to_string(keyword),
            text:    latin1_to_string(text)
        });

        // skip crc
        self.stream.skip(4);

        Ok(())
    }

    pub(crate) fn parse_ztxt(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        let payload = self.stream.get_as_ref(chunk.length)?;

        let (keyword, rest) = split_keyword(payload)?;

        let (&method, compressed) = rest
            .split_first()
            .ok_or(PngErrors::GenericStatic("zTXt chunk too short"))?;

        if method != 0
        {
            return Err(PngErrors::Generic(format!(
                "Unknown zTXt compression method {method}"
            )));
        }

        let text = quartz_inflate::DeflateDecoder::new(compressed)
            .decode_zlib()
            .map_err(PngErrors::ZlibDecodeErrors)?;

        self.ztxt_chunks.push(ZtxtChunk {
            keyword: latin1_to_string(keyword),
            text:    latin1_to_string(&text)
        });

        // skip crc
        self.stream.skip(4);

        Ok(())
    }

    pub(crate) fn parse_itxt(&mut self, chunk: PngChunk) -> Result<(), PngErrors>
    {
        let payload = self.stream.get_as_ref(chunk.length)?;

        let (keyword, rest) = split_keyword(payload)?;

        if rest.len() < 2
        {
            return Err(PngErrors::GenericStatic("iTXt chunk too short"));
        }
        let compression_flag = rest[0];
        let compression_method = rest[1];

        let (language_tag, rest) = split_keyword(&rest[2..])?;
        let (translated_keyword, text_bytes) = split_keyword(rest)?;

        let text = match compression_flag
        {
            0 => text_bytes.to_vec(),
            1 =>
            {
                if compression_method != 0
                {
                    return Err(PngErrors::Generic(format!(
                        "Unknown iTXt compression method {compression_method}"
                    )));
                }
                quartz_inflate::DeflateDecoder::new(text_bytes)
                    .decode_zlib()
                    .map_err(PngErrors::ZlibDecodeErrors)?
            }
            _ =>
            {
                return Err(PngErrors::Generic(format!(
                    "Unknown iTXt compression flag {compression_flag}"
                )));
            }
        };

        self.itxt_chunks.push(ItxtChunk {
            keyword:            latin1_to_string(keyword),
            language_tag:       latin1_to_string(language_tag),
            translated_keyword: utf8_to_string(translated_keyword)?,
            text:               utf8_to_string(&text)?
        });

        // skip crc
        self.stream.skip(4);

        Ok(())
    }
}

/// Split a chunk payload at the NUL terminating its keyword
fn split_keyword(payload: &[u8]) -> Result<(&[u8], &[u8]), PngErrors>
{
    match payload.iter().position(|b| *b == 0)
    {
        Some(position) => Ok((&payload[..position], &payload[position + 1..])),
        None => Err(PngErrors::GenericStatic(
            "Text chunk keyword has no NUL terminator"
        ))
    }
}

/// Latin-1 maps byte for byte onto the first 256 code points
fn latin1_to_string(data: &[u8]) -> String
{
    data.iter().map(|b| char::from(*b)).collect()
}

fn utf8_to_string(data: &[u8]) -> Result<String, PngErrors>
{
    match std::str::from_utf8(data)
    {
        Ok(text) => Ok(text.to_string()),
        Err(_) => Err(PngErrors::GenericStatic("Invalid UTF-8 in iTXt chunk"))
    }
}
