/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;
use std::process::exit;

use clap::ArgMatches;
use log::{error, info, Level};
use quartz_core::result::DecodingResult;
use quartz_png::error::PngErrors;
use quartz_png::PngDecoder;

mod cmd_args;

pub fn main()
{
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    setup_logger(&options);

    let path = options.get_one::<OsString>("in").unwrap();

    if let Err(reason) = decode_file(path)
    {
        println!();
        error!(" Could not decode {:?}, reason {:?}", path, reason);
        println!();
        exit(1);
    }
}

/// Set up logging options
fn setup_logger(options: &ArgMatches)
{
    let log_level = if *options.get_one::<bool>("logging").unwrap()
    {
        Level::Trace
    }
    else
    {
        Level::Warn
    };

    simple_logger::init_with_level(log_level).unwrap();

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}

fn decode_file(path: &OsString) -> Result<(), PngErrors>
{
    let contents = std::fs::read(path)
        .map_err(|e| PngErrors::Generic(format!("Cannot read {path:?}: {e}")))?;

    let mut decoder = PngDecoder::new(&contents);

    let pixels = decoder.decode()?;

    // headers decoded by now, the accessors are present
    let (width, height) = decoder.get_dimensions().unwrap();
    let colorspace = decoder.get_colorspace().unwrap();
    let depth = decoder.get_depth().unwrap();

    let samples = match &pixels
    {
        DecodingResult::U8(data) => data.len(),
        DecodingResult::U16(data) => data.len(),
        _ => 0
    };

    println!(
        "{}x{} {:?} {:?}, {} samples",
        width, height, colorspace, depth, samples
    );

    if let Some(gamma) = decoder.get_gamma()
    {
        println!("gamma: {gamma}");
    }
    for text in decoder.get_text_chunks()
    {
        println!("{}: {}", text.keyword, text.text);
    }

    Ok(())
}
