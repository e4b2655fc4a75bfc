use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn create_cmd_args() -> Command
{
    Command::new("quartz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode a png file and report its properties")
        .arg(
            Arg::new("in")
                .help("Input png file to decode")
                .action(ArgAction::Set)
                .value_parser(value_parser!(OsString))
                .required(true)
                .index(1)
        )
        .arg(
            Arg::new("logging")
                .long("logging")
                .short('l')
                .help_heading("Logging")
                .help("Log chunk and block level diagnostics while decoding")
                .action(ArgAction::SetTrue)
        )
}
