//! Build target definitions.
//!
//! A build target is one animation to convert into one atlas.

use std::path::PathBuf;

/// A build target representing work to be done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Unique identifier for this target (e.g., "atlas:player")
    pub id: String,
    /// Human-readable name (input file stem)
    pub name: String,
    /// Animation to decode
    pub input: PathBuf,
    /// Atlas PNG to write
    pub output: PathBuf,
}

impl BuildTarget {
    /// Create a new atlas target.
    pub fn atlas(name: String, input: PathBuf, output: PathBuf) -> Self {
        let id = format!("atlas:{}", name);
        Self { id, name, input, output }
    }
}

impl std::fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} -> {})", self.id, self.input.display(), self.output.display())
    }
}

/// Ordered list of targets for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    targets: Vec<BuildTarget>,
}

impl BuildPlan {
    /// Create an empty build plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a target.
    pub fn add_target(&mut self, target: BuildTarget) {
        self.targets.push(target);
    }

    /// Targets in configured order.
    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up a target by id.
    pub fn get(&self, id: &str) -> Option<&BuildTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Keep only targets whose id or name is listed in `filter`.
    pub fn filter(self, filter: &[String]) -> Self {
        let targets = self
            .targets
            .into_iter()
            .filter(|t| filter.iter().any(|f| *f == t.id || *f == t.name))
            .collect();
        Self { targets }
    }
}
