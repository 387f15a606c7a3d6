//! Per-target outcomes and the batch summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Atlas (and sidecar, if enabled) written
    Built,
    /// Never converted: dry run, or stopped by fail-fast
    Skipped,
    /// Conversion error message
    Failed(String),
}

impl BuildStatus {
    /// Built and skipped targets both count as not failed.
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Built => f.write_str("built"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcome of one `atlas:<name>` target.
#[derive(Debug, Clone)]
pub struct TargetResult {
    pub target_id: String,
    pub status: BuildStatus,
    /// Files written (atlas first, then sidecar)
    pub outputs: Vec<PathBuf>,
    /// Frames packed into the atlas; 0 unless built
    pub frames: usize,
    pub duration: Duration,
}

impl TargetResult {
    pub fn success(
        target_id: String,
        outputs: Vec<PathBuf>,
        frames: usize,
        duration: Duration,
    ) -> Self {
        Self { target_id, status: BuildStatus::Built, outputs, frames, duration }
    }

    pub fn skipped(target_id: String) -> Self {
        Self::empty(target_id, BuildStatus::Skipped, Duration::ZERO)
    }

    pub fn failed(target_id: String, error: String, duration: Duration) -> Self {
        Self::empty(target_id, BuildStatus::Failed(error), duration)
    }

    fn empty(target_id: String, status: BuildStatus, duration: Duration) -> Self {
        Self { target_id, status, outputs: Vec::new(), frames: 0, duration }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// All target outcomes of one build, in plan order.
#[derive(Debug, Default)]
pub struct BuildResult {
    pub targets: Vec<TargetResult>,
    /// Wall time of the whole batch
    pub total_duration: Duration,
}

impl BuildResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: TargetResult) {
        self.targets.push(result);
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    fn count(&self, pred: impl Fn(&BuildStatus) -> bool) -> usize {
        self.targets.iter().filter(|t| pred(&t.status)).count()
    }

    /// Number of atlases written.
    pub fn success_count(&self) -> usize {
        self.count(|s| *s == BuildStatus::Built)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| *s == BuildStatus::Skipped)
    }

    pub fn failed_count(&self) -> usize {
        self.count(BuildStatus::is_failure)
    }

    /// True when no target failed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Every file written by the batch.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.targets.iter().flat_map(|t| &t.outputs).collect()
    }

    /// Frames packed across all atlases.
    pub fn total_frames(&self) -> usize {
        self.targets.iter().map(|t| t.frames).sum()
    }

    pub fn failures(&self) -> Vec<&TargetResult> {
        self.targets.iter().filter(|t| t.status.is_failure()).collect()
    }

    /// One-line verdict, followed by one line per failed target.
    pub fn summary(&self) -> String {
        let built = self.success_count();
        let skipped = self.skipped_count();
        let failed = self.failed_count();

        if failed == 0 {
            return format!(
                "Build succeeded: {} atlases, {} frames, {} skipped ({} total) in {:?}",
                built,
                self.total_frames(),
                skipped,
                self.targets.len(),
                self.total_duration
            );
        }

        let mut out = format!(
            "Build failed: {} built, {} skipped, {} failed ({} total)",
            built,
            skipped,
            failed,
            self.targets.len()
        );
        for target in self.failures() {
            out.push_str(&format!("\n  {} {}", target.target_id, target.status));
        }
        out
    }
}
