//! animatlas - Command-line tool for packing animation frames into sprite-sheet atlases

use std::process::ExitCode;

use animatlas::cli;

fn main() -> ExitCode {
    cli::run()
}
