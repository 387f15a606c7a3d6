//! Single-file conversion: decode -> plan -> compose -> encode
//!
//! A [`Converter`] owns the column policy and turns one animation into one
//! atlas PNG (plus an optional JSON sidecar). Nothing is written unless every
//! stage before the encoder succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compose::compose;
use crate::encode::stage_png;
use crate::error::{AtlasError, AtlasResult};
use crate::frames::{FrameSource, ImageFrameSource};
use crate::layout::{check_columns, AtlasPlan};
use crate::metadata::AtlasMetadata;

/// Default grid width, matching the game's animation layouts.
pub const DEFAULT_COLUMNS: u32 = 5;

/// Outcome of converting one animation.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Sidecar path, when metadata output is enabled
    pub metadata: Option<PathBuf>,
    pub plan: AtlasPlan,
}

impl ConversionReport {
    pub fn frame_count(&self) -> usize {
        self.plan.frame_count
    }

    /// All files written by the conversion.
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut outputs = vec![self.output.clone()];
        outputs.extend(self.metadata.clone());
        outputs
    }
}

/// Converts animations into grid atlases.
#[derive(Debug, Clone)]
pub struct Converter<S = ImageFrameSource> {
    columns: u32,
    metadata: bool,
    source: S,
}

impl Converter {
    /// Create a converter laying frames out in `columns` columns.
    pub fn new(columns: u32) -> Self {
        Self { columns, metadata: false, source: ImageFrameSource }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl<S: FrameSource> Converter<S> {
    /// Use a different frame source.
    pub fn with_source<T: FrameSource>(self, source: T) -> Converter<T> {
        Converter { columns: self.columns, metadata: self.metadata, source }
    }

    /// Also write a JSON sidecar next to each atlas.
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Check the conversion parameters for `output` without touching any file.
    ///
    /// Rejects a zero column count, and a sidecar path that would coincide
    /// with the atlas itself (an output already ending in `.json`).
    pub fn check(&self, output: &Path) -> AtlasResult<()> {
        check_columns(self.columns)?;
        if self.metadata && metadata_path(output) == output {
            return Err(AtlasError::invalid_configuration(format!(
                "metadata sidecar would overwrite the atlas {}; use a .png output",
                output.display()
            )));
        }
        Ok(())
    }

    /// Decode `input` and compute its layout without writing anything.
    pub fn plan(&self, input: &Path) -> AtlasResult<AtlasPlan> {
        check_columns(self.columns)?;
        let frames = self.source.frames(input)?;
        AtlasPlan::for_frames(&frames, self.columns)
    }

    /// Convert `input` into an atlas at `output`.
    ///
    /// Parameters are checked before the input is opened. The atlas and the
    /// sidecar are both fully written to temporary files before either one
    /// replaces its destination, so on error no output file is created and
    /// existing ones are left untouched.
    pub fn convert(&self, input: &Path, output: &Path) -> AtlasResult<ConversionReport> {
        self.check(output)?;

        let frames = self.source.frames(input)?;
        if frames.is_empty() {
            return Err(AtlasError::EmptyAnimation { path: input.to_path_buf() });
        }

        let plan = AtlasPlan::for_frames(&frames, self.columns)?;
        debug!(
            input = %input.display(),
            frames = plan.frame_count,
            columns = plan.columns,
            rows = plan.rows,
            cell_width = plan.cell_width,
            cell_height = plan.cell_height,
            "planned atlas"
        );

        let canvas = compose(&plan, &frames)?;
        let atlas = stage_png(&canvas, output)?;

        let sidecar = if self.metadata {
            let image_name = output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(AtlasMetadata::new(image_name, &plan, &frames).stage(&metadata_path(output))?)
        } else {
            None
        };
        let metadata = sidecar.as_ref().map(|staged| staged.path().to_path_buf());

        atlas.commit()?;
        if let Some(staged) = sidecar {
            if let Err(e) = staged.commit() {
                // The atlas already replaced its destination; take it back out.
                if let Err(remove) = fs::remove_file(output) {
                    warn!(output = %output.display(), "failed to remove atlas: {}", remove);
                }
                return Err(e);
            }
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            frames = plan.frame_count,
            "converted {}x{} atlas",
            plan.canvas_width,
            plan.canvas_height
        );

        Ok(ConversionReport { input: input.to_path_buf(), output: output.to_path_buf(), metadata, plan })
    }
}

/// Convert with the default frame source.
pub fn convert_file(
    input: &Path,
    output: &Path,
    columns: u32,
) -> AtlasResult<ConversionReport> {
    Converter::new(columns).convert(input, output)
}

/// `out_dir/<input stem>.png`
pub fn default_output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("atlas");
    out_dir.join(format!("{}.png", stem))
}

/// Sidecar path for an atlas: same location, `.json` extension.
pub fn metadata_path(output: &Path) -> PathBuf {
    output.with_extension("json")
}
