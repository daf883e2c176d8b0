/*!
Strata maintains ranked point, line and polygon features in a GeoPackage file. Every insert or update is checked against the rank rules, and new polygons are carved down so that they never overlap polygons which are already stored.
*/

use clap::Parser;

pub(crate) mod errors;
pub mod commands;
pub(crate) mod geometry;
pub(crate) mod typed_map;
pub(crate) mod feature_map;
pub(crate) mod utils;
pub(crate) mod progress;
pub(crate) mod algorithms;
pub(crate) mod service;

use errors::ProgramError;

use commands::Strata;
use commands::Task as _;
use progress::ConsoleProgressBar;

/**
Runs Strata with arbitrary arguments. The first item in the arguments will be ignored. All output will be printed to Stdout or Stderr.
*/
pub fn run<Arg, Args>(args: &mut Args) -> Result<(),ProgramError>
where
    Arg: Clone + Into<std::ffi::OsString>,
    Args: Iterator<Item = Arg>
{
    let mut progress = ConsoleProgressBar::new();
    let command = Strata::try_parse_from(args)?;
    command.run(&mut progress)?;
    Ok(())
}

fn main() -> std::process::ExitCode {
    let mut args = std::env::args();
    // The built-in Result return formats errors with debug instead of display, so handle it here.
    match run(&mut args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}",err);
            std::process::ExitCode::FAILURE
        }
    }
}
