//! Locating, reading and overriding `atlas.toml`

use super::schema::{ProjectFile, CONFIG_FILE_NAME};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a project file could not be used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read atlas.toml: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse atlas.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Every validation problem, one message each
    #[error("Invalid atlas.toml:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Command-line values that win over the project file. `None` keeps the
/// file's value.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub out: Option<PathBuf>,
    pub columns: Option<u32>,
    pub metadata: Option<bool>,
    pub jobs: Option<usize>,
    pub fail_fast: Option<bool>,
}

/// Search the working directory and its ancestors for atlas.toml.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Search `start` and its ancestors for atlas.toml.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(CONFIG_FILE_NAME)).find(|candidate| candidate.is_file())
}

/// Read and parse an atlas.toml.
///
/// The result is not validated, so command-line overrides can still replace
/// bad values; run [`validate_config`] once they are merged. An empty
/// `project.name` is filled in with the name of the directory holding the
/// file.
///
/// ```ignore
/// let mut config = load_config(Path::new("game/atlas.toml"))?;
/// merge_cli_overrides(&mut config, &overrides);
/// validate_config(&config)?;
/// ```
pub fn load_config(path: &Path) -> Result<ProjectFile, ConfigError> {
    let mut config = parse_config(&fs::read_to_string(path)?)?;

    if config.project.name.is_empty() {
        config.project.name = project_root(path)
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
    }

    Ok(config)
}

/// Parse atlas.toml text without validating it.
pub fn parse_config(contents: &str) -> Result<ProjectFile, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Collect every validation problem into one [`ConfigError::Validation`].
pub fn validate_config(config: &ProjectFile) -> Result<(), ConfigError> {
    let problems: Vec<String> = config.validate().iter().map(ToString::to_string).collect();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(problems))
    }
}

/// Apply command-line overrides on top of a loaded configuration.
///
/// The result is not validated here; callers run [`validate_config`] afterwards.
pub fn merge_cli_overrides(config: &mut ProjectFile, overrides: &CliOverrides) {
    if let Some(out) = &overrides.out {
        config.project.out = out.clone();
    }
    if let Some(columns) = overrides.columns {
        config.atlas.columns = columns;
    }
    if let Some(metadata) = overrides.metadata {
        config.atlas.metadata = metadata;
    }
    if let Some(jobs) = overrides.jobs {
        config.build.jobs = jobs;
    }
    if let Some(fail_fast) = overrides.fail_fast {
        config.build.fail_fast = fail_fast;
    }
}

/// Directory holding the config file; relative paths in it resolve from here.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// `path` itself when absolute, otherwise `project_root/path`.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
