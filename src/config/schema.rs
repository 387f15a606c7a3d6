//! Configuration schema types for `atlas.toml`
//!
//! Defines the structure and validation rules for an atlas project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::convert::DEFAULT_COLUMNS;

/// File name searched for during config discovery
pub const CONFIG_FILE_NAME: &str = "atlas.toml";

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (defaults to the directory name)
    #[serde(default)]
    pub name: String,
    /// Directory receiving the atlases
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: String::new(), out: default_out() }
    }
}

fn default_out() -> PathBuf {
    PathBuf::from("assets/textures")
}

/// Atlas layout and input batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Grid columns, shared by every input
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Write a JSON sidecar next to each atlas
    #[serde(default)]
    pub metadata: bool,
    /// Input files or glob patterns, relative to the config file
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self { columns: default_columns(), metadata: false, inputs: Vec::new() }
    }
}

fn default_columns() -> u32 {
    DEFAULT_COLUMNS
}

/// Batch execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Number of inputs converted concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Stop after the first failed input
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { jobs: default_jobs(), fail_fast: false }
    }
}

fn default_jobs() -> usize {
    1
}

/// Complete atlas.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub atlas: AtlasConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// One invalid value in atlas.toml
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Dotted key, e.g. `atlas.columns` or `atlas.inputs[2]`
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILE_NAME, self.field, self.message)
    }
}

impl ConfigValidationError {
    fn new(field: impl Into<String>, message: &str) -> Self {
        Self { field: field.into(), message: message.to_string() }
    }
}

impl ProjectFile {
    /// Every problem in the file, in field order. Empty means valid.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.atlas.columns == 0 {
            errors.push(ConfigValidationError::new("atlas.columns", "must be at least 1"));
        }
        if self.atlas.inputs.is_empty() {
            errors.push(ConfigValidationError::new(
                "atlas.inputs",
                "must contain at least one path or glob pattern",
            ));
        }
        errors.extend(
            self.atlas
                .inputs
                .iter()
                .enumerate()
                .filter(|(_, input)| input.trim().is_empty())
                .map(|(i, _)| ConfigValidationError::new(format!("atlas.inputs[{}]", i), "is blank")),
        );
        if self.build.jobs == 0 {
            errors.push(ConfigValidationError::new("build.jobs", "must be at least 1"));
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
