//! Build command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{load_context, BuildError, BuildPipeline};
use crate::config::{CliOverrides, ConfigError};

/// Arguments of the build command
pub struct BuildArgs {
    pub config: Option<PathBuf>,
    pub columns: Option<u32>,
    pub out: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub metadata: bool,
    pub fail_fast: bool,
    pub dry_run: bool,
    pub targets: Vec<String>,
}

impl BuildArgs {
    /// Flags only override the config when given.
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            out: self.out.clone(),
            columns: self.columns,
            metadata: self.metadata.then_some(true),
            jobs: self.jobs,
            fail_fast: self.fail_fast.then_some(true),
        }
    }
}

/// Run the build command
pub fn run_build(args: BuildArgs) -> ExitCode {
    let mut context = match load_context(args.config.as_deref(), &args.overrides()) {
        Ok(ctx) => ctx,
        Err(BuildError::Config(e @ ConfigError::Validation(_))) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if !args.targets.is_empty() {
        context = context.with_filter(args.targets.clone());
    }

    let pipeline = BuildPipeline::new(context).with_dry_run(args.dry_run);

    if args.dry_run {
        let plan = match pipeline.plan() {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        println!("Dry run - would build {} atlases:", plan.len());
        for target in plan.targets() {
            println!("  {}", target);
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    match pipeline.build() {
        Ok(result) => {
            for target in &result.targets {
                for output in &target.outputs {
                    println!("  {}", output.display());
                }
            }
            if result.is_success() {
                println!("{}", result.summary());
                ExitCode::from(EXIT_SUCCESS)
            } else {
                eprintln!("{}", result.summary());
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
