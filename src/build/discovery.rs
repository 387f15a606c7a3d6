//! Input discovery for the build system.
//!
//! Expands the `atlas.inputs` entries of the configuration into concrete
//! animation files and turns each one into a [`BuildTarget`].

use crate::build::{BuildContext, BuildPlan, BuildTarget};
use crate::convert::default_output_path;
use glob::glob;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Error during input discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, #[source] glob::PatternError),
    /// Two inputs would overwrite each other's atlas
    #[error("Inputs {} and {} both write {}", .first.display(), .second.display(), .output.display())]
    OutputCollision {
        /// Input that claimed the output first
        first: PathBuf,
        /// Input that collides with it
        second: PathBuf,
        /// Shared output path
        output: PathBuf,
    },
    /// An atlas would replace one of the inputs
    #[error("Atlas for {} would overwrite input {}", .input.display(), .output.display())]
    OutputOverwritesInput {
        /// Input being converted
        input: PathBuf,
        /// Its atlas path, which is also an input
        output: PathBuf,
    },
}

/// Whether an input entry should be expanded as a glob pattern.
pub fn is_glob_pattern(input: &str) -> bool {
    input.contains(&['*', '?', '['][..])
}

/// Discover files matching a glob pattern, sorted.
///
/// # Arguments
/// - `base_dir` - Base directory to resolve patterns from
/// - `pattern` - Glob pattern to match
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let full_pattern = base_dir.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let paths =
        glob(&pattern_str).map_err(|e| DiscoveryError::InvalidPattern(pattern.to_string(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                warn!("error reading path while expanding '{}': {}", pattern, e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Resolve every configured input to a file path.
///
/// Literal paths are kept even when missing so the conversion reports them.
/// Order follows the configuration; duplicates keep their first position.
pub fn discover_inputs(ctx: &BuildContext) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();

    for entry in &ctx.config().atlas.inputs {
        let paths = if is_glob_pattern(entry) {
            let files = discover_files(ctx.project_root(), entry)?;
            if files.is_empty() {
                warn!("input pattern '{}' matched no files", entry);
            }
            files
        } else {
            vec![ctx.resolve_path(Path::new(entry))]
        };

        for path in paths {
            if seen.insert(path.clone()) {
                inputs.push(path);
            }
        }
    }

    Ok(inputs)
}

/// Create a build plan from the configuration and discovered inputs.
///
/// Each input becomes one `atlas:<stem>` target writing `<out>/<stem>.png`.
/// No atlas may land on an input file or on another target's atlas.
pub fn create_build_plan(ctx: &BuildContext) -> Result<BuildPlan, DiscoveryError> {
    let out_dir = ctx.out_dir();
    let inputs = discover_inputs(ctx)?;
    let sources: HashSet<&PathBuf> = inputs.iter().collect();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut plan = BuildPlan::new();

    for input in &inputs {
        let output = default_output_path(input, &out_dir);
        if sources.contains(&output) {
            return Err(DiscoveryError::OutputOverwritesInput { input: input.clone(), output });
        }
        if let Some(first) = claimed.get(&output) {
            return Err(DiscoveryError::OutputCollision {
                first: first.clone(),
                second: input.clone(),
                output,
            });
        }
        claimed.insert(output.clone(), input.clone());

        let name = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "atlas".to_string());
        plan.add_target(BuildTarget::atlas(name, input.clone(), output));
    }

    Ok(plan)
}
