//! Build pipeline orchestration.
//!
//! The pipeline turns a build plan into atlases, one conversion per target,
//! either in order on the calling thread or spread over a rayon pool.

use crate::build::{BuildContext, BuildPlan, BuildResult, BuildTarget, DiscoveryError, TargetResult};
use crate::config::{
    find_config, load_config, merge_cli_overrides, project_root, validate_config, CliOverrides,
    ConfigError,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error during build execution.
///
/// Conversion failures are not errors here; they are recorded per target in
/// the [`BuildResult`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// No atlas.toml in the working directory or any parent
    #[error("No atlas.toml found in this directory or any parent")]
    ConfigNotFound,
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
    /// Worker pool could not be created
    #[error("Failed to start build workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the project configuration and apply CLI overrides.
///
/// Without an explicit path, atlas.toml is searched for from the working
/// directory upwards. The file is validated only after overrides are merged,
/// so a flag can replace an invalid value from the file.
pub fn load_context(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<BuildContext, BuildError> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config().ok_or(BuildError::ConfigNotFound)?,
    };

    let mut config = load_config(&path)?;
    merge_cli_overrides(&mut config, overrides);

    validate_config(&config)?;

    let root = project_root(&path)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(BuildContext::new(config, root))
}

/// Build pipeline for executing builds.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Whether to do a dry run (don't actually build)
    dry_run: bool,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(context: BuildContext) -> Self {
        Self { context, dry_run: false }
    }

    /// Set dry-run mode (plan targets, write nothing).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run the build pipeline.
    ///
    /// Discovers inputs, creates a build plan, and executes it.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let plan = self.plan()?;
        self.build_plan(&plan)
    }

    /// Discover inputs and apply the target filter, without building.
    pub fn plan(&self) -> Result<BuildPlan, BuildError> {
        let plan = crate::build::create_build_plan(&self.context)?;
        Ok(match self.context.target_filter() {
            Some(filter) => plan.filter(filter),
            None => plan,
        })
    }

    /// Run the build pipeline with a pre-created plan.
    pub fn build_plan(&self, plan: &BuildPlan) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        info!(targets = plan.len(), jobs = self.context.jobs(), "starting build");
        for target in plan.targets() {
            debug!("planned {}", target);
        }

        let targets = if self.context.jobs() > 1 && plan.len() > 1 {
            self.execute_parallel(plan)?
        } else {
            self.execute_sequential(plan)
        };

        let mut result = BuildResult::new();
        for target in targets {
            result.add_result(target);
        }
        Ok(result.with_duration(start.elapsed()))
    }

    fn fail_fast(&self) -> bool {
        self.context.config().build.fail_fast
    }

    fn execute_sequential(&self, plan: &BuildPlan) -> Vec<TargetResult> {
        let mut results = Vec::with_capacity(plan.len());
        let mut stopped = false;

        for target in plan.targets() {
            if stopped {
                results.push(TargetResult::skipped(target.id.clone()));
                continue;
            }

            let result = self.execute_target(target);
            if result.status.is_failure() && self.fail_fast() {
                stopped = true;
            }
            results.push(result);
        }

        results
    }

    /// Targets run on a dedicated pool sized by `jobs`; `collect` keeps plan
    /// order regardless of completion order.
    fn execute_parallel(&self, plan: &BuildPlan) -> Result<Vec<TargetResult>, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.context.jobs()).build()?;
        let stopped = AtomicBool::new(false);

        let results = pool.install(|| {
            plan.targets()
                .par_iter()
                .map(|target| {
                    if stopped.load(Ordering::Relaxed) {
                        return TargetResult::skipped(target.id.clone());
                    }
                    let result = self.execute_target(target);
                    if result.status.is_failure() && self.fail_fast() {
                        stopped.store(true, Ordering::Relaxed);
                    }
                    result
                })
                .collect()
        });

        Ok(results)
    }

    /// Execute a single build target.
    fn execute_target(&self, target: &BuildTarget) -> TargetResult {
        if self.dry_run {
            return TargetResult::skipped(target.id.clone());
        }

        let start = Instant::now();
        match self.context.converter().convert(&target.input, &target.output) {
            Ok(report) => {
                TargetResult::success(
                    target.id.clone(),
                    report.outputs(),
                    report.frame_count(),
                    start.elapsed(),
                )
            }
            Err(e) => {
                warn!(target = %target.id, error_kind = e.kind(), "{}", e);
                TargetResult::failed(target.id.clone(), e.to_string(), start.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildStatus;
    use crate::config::parse_config;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn write_gif(path: &Path, frames: usize, size: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut encoder = GifEncoder::new(File::create(path).unwrap());
        for i in 0..frames {
            let image = RgbaImage::from_pixel(size, size, Rgba([(i * 40) as u8, 10, 10, 255]));
            encoder
                .encode_frame(Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(100, 1)))
                .unwrap();
        }
    }

    fn context(temp: &TempDir, toml: &str) -> BuildContext {
        BuildContext::new(parse_config(toml).unwrap(), temp.path().to_path_buf())
    }

    #[test]
    fn test_build_converts_every_input() {
        let temp = TempDir::new().unwrap();
        write_gif(&temp.path().join("raw/player.gif"), 7, 8);
        write_gif(&temp.path().join("raw/bat.gif"), 3, 4);

        let ctx = context(&temp, "[atlas]\ncolumns = 5\ninputs = [\"raw/*.gif\"]\n");
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert!(result.is_success(), "{}", result.summary());
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.total_frames(), 10);
        assert_eq!(result.targets[0].target_id, "atlas:bat");
        assert_eq!(result.targets[1].target_id, "atlas:player");

        let atlas = image::open(temp.path().join("assets/textures/player.png")).unwrap();
        assert_eq!((atlas.width(), atlas.height()), (40, 16));
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        write_gif(&temp.path().join("raw/good.gif"), 2, 4);

        let ctx = context(&temp, "[atlas]\ninputs = [\"raw/missing.gif\", \"raw/good.gif\"]\n");
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.success_count(), 1);
        assert!(matches!(result.targets[0].status, BuildStatus::Failed(ref m) if m.contains("missing.gif")));
        assert!(!temp.path().join("assets/textures/missing.png").exists());
        assert!(temp.path().join("assets/textures/good.png").exists());
    }

    #[test]
    fn test_fail_fast_skips_remaining_targets() {
        let temp = TempDir::new().unwrap();
        write_gif(&temp.path().join("raw/good.gif"), 2, 4);

        let ctx = context(
            &temp,
            "[atlas]\ninputs = [\"raw/missing.gif\", \"raw/good.gif\"]\n[build]\nfail_fast = true\n",
        );
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.skipped_count(), 1);
        assert!(!temp.path().join("assets/textures/good.png").exists());
    }

    #[test]
    fn test_parallel_build_keeps_plan_order() {
        let temp = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            write_gif(&temp.path().join(format!("raw/{}.gif", name)), 3, 6);
        }

        let ctx = context(
            &temp,
            "[atlas]\ncolumns = 2\nmetadata = true\ninputs = [\"raw/*.gif\"]\n[build]\njobs = 3\n",
        );
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert!(result.is_success(), "{}", result.summary());
        let ids: Vec<_> = result.targets.iter().map(|t| t.target_id.as_str()).collect();
        assert_eq!(ids, vec!["atlas:a", "atlas:b", "atlas:c", "atlas:d", "atlas:e"]);
        assert_eq!(result.all_outputs().len(), 10);
        assert!(temp.path().join("assets/textures/c.json").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        write_gif(&temp.path().join("raw/player.gif"), 2, 4);

        let ctx = context(&temp, "[atlas]\ninputs = [\"raw/player.gif\"]\n");
        let result = BuildPipeline::new(ctx).with_dry_run(true).build().unwrap();

        assert_eq!(result.skipped_count(), 1);
        assert!(!temp.path().join("assets").exists());
    }

    #[test]
    fn test_filter_limits_targets() {
        let temp = TempDir::new().unwrap();
        write_gif(&temp.path().join("raw/a.gif"), 1, 4);
        write_gif(&temp.path().join("raw/b.gif"), 1, 4);

        let ctx = context(&temp, "[atlas]\ninputs = [\"raw/*.gif\"]\n")
            .with_filter(vec!["b".to_string()]);
        let result = BuildPipeline::new(ctx).build().unwrap();

        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].target_id, "atlas:b");
    }

    #[test]
    fn test_load_context_applies_overrides() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("atlas.toml");
        fs::write(&config_path, "[atlas]\ninputs = [\"raw/*.gif\"]\n").unwrap();

        let overrides = CliOverrides { columns: Some(8), jobs: Some(2), ..Default::default() };
        let ctx = load_context(Some(&config_path), &overrides).unwrap();
        assert_eq!(ctx.columns(), 8);
        assert_eq!(ctx.jobs(), 2);
        assert_eq!(ctx.project_root(), temp.path());
    }

    #[test]
    fn test_load_context_override_fixes_invalid_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("atlas.toml");
        fs::write(&config_path, "[atlas]\ncolumns = 0\ninputs = [\"raw/*.gif\"]\n").unwrap();

        let err = load_context(Some(&config_path), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::Validation(_))));

        let overrides = CliOverrides { columns: Some(3), ..Default::default() };
        let ctx = load_context(Some(&config_path), &overrides).unwrap();
        assert_eq!(ctx.columns(), 3);
    }

    #[test]
    fn test_load_context_rejects_invalid_override() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("atlas.toml");
        fs::write(&config_path, "[atlas]\ninputs = [\"raw/*.gif\"]\n").unwrap();

        let overrides = CliOverrides { columns: Some(0), ..Default::default() };
        let err = load_context(Some(&config_path), &overrides).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::Validation(_))));
    }
}
