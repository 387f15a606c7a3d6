//! Everything a batch build needs to know about its project.

use crate::config::ProjectFile;
use crate::convert::Converter;
use std::path::{Path, PathBuf};

/// A validated `atlas.toml` anchored at its directory.
///
/// Relative paths from the file (inputs, `project.out`) resolve against
/// `project_root`.
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: ProjectFile,
    /// Directory of atlas.toml
    project_root: PathBuf,
    /// Target names or ids to restrict the build to
    target_filter: Option<Vec<String>>,
}

impl BuildContext {
    pub fn new(config: ProjectFile, project_root: PathBuf) -> Self {
        Self { config, project_root, target_filter: None }
    }

    pub fn config(&self) -> &ProjectFile {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// `project.out` resolved against the project root.
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.out)
    }

    /// Only build targets whose name or id is listed.
    pub fn with_filter(mut self, targets: Vec<String>) -> Self {
        self.target_filter = Some(targets);
        self
    }

    pub fn target_filter(&self) -> Option<&[String]> {
        self.target_filter.as_deref()
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path)
    }

    /// Grid columns shared by every input.
    pub fn columns(&self) -> u32 {
        self.config.atlas.columns
    }

    /// Worker count for the batch.
    pub fn jobs(&self) -> usize {
        self.config.build.jobs.max(1)
    }

    /// Converter configured with this project's column and metadata policy.
    pub fn converter(&self) -> Converter {
        Converter::new(self.config.atlas.columns).with_metadata(self.config.atlas.metadata)
    }
}
