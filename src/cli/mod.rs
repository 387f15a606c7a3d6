//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod convert;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::convert::DEFAULT_COLUMNS;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// animatlas - Pack animation frames into uniform-grid sprite sheets
#[derive(Parser)]
#[command(name = "animatlas")]
#[command(about = "Pack the frames of animated images (GIF, APNG) into grid texture atlases")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one animation into an atlas PNG
    Convert {
        /// Animated image to read (GIF, APNG, or a still image)
        input: PathBuf,

        /// Atlas file to write [default: <input stem>.png next to the input]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of grid columns
        #[arg(short, long, default_value_t = DEFAULT_COLUMNS)]
        columns: u32,

        /// Also write a JSON sidecar describing the grid
        #[arg(long)]
        metadata: bool,
    },

    /// Decode an animation and print its atlas layout without writing
    Plan {
        /// Animated image to read
        input: PathBuf,

        /// Number of grid columns
        #[arg(short, long, default_value_t = DEFAULT_COLUMNS)]
        columns: u32,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert every input listed in atlas.toml
    Build {
        /// Config file [default: atlas.toml in this or a parent directory]
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override grid columns
        #[arg(long)]
        columns: Option<u32>,

        /// Override output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of parallel jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write JSON sidecars for every atlas
        #[arg(long)]
        metadata: bool,

        /// Stop at the first failed input
        #[arg(long)]
        fail_fast: bool,

        /// Show what would be built without writing
        #[arg(long)]
        dry_run: bool,

        /// Only build these targets (name or atlas:<name>)
        targets: Vec<String>,
    },
}

/// Install the global log subscriber.
///
/// Logs go to stderr so stdout stays free for command output.
fn init_logging(verbose: bool, no_color: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    // Already set when embedded in a host that installed its own.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    match cli.command {
        Commands::Convert { input, output, columns, metadata } => {
            convert::run_convert(&input, output.as_deref(), columns, metadata)
        }
        Commands::Plan { input, columns, json } => convert::run_plan(&input, columns, json),
        Commands::Build { config, columns, out, jobs, metadata, fail_fast, dry_run, targets } => {
            build::run_build(build::BuildArgs {
                config,
                columns,
                out,
                jobs,
                metadata,
                fail_fast,
                dry_run,
                targets,
            })
        }
    }
}
