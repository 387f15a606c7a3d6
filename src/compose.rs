//! Atlas composition - blits frames into their grid cells

use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

use crate::error::{AtlasError, AtlasResult};
use crate::frames::Frame;
use crate::layout::AtlasPlan;

/// Fill color of the canvas and of every pixel no frame covers
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Compose frames into a single atlas canvas.
///
/// The frame at position `i` is copied unscaled to [`AtlasPlan::cell_origin`]`(i)`.
/// Frame pixels overwrite the canvas directly (no alpha blending), and frames
/// smaller than the cell leave the rest of their cell transparent.
///
/// All frames are checked against the plan before the canvas is allocated, so
/// an oversized frame never bleeds into a neighbouring cell.
///
/// # Errors
///
/// * [`AtlasError::InvalidConfiguration`] if the plan was made for a
///   different number of frames.
/// * [`AtlasError::LayoutInvariant`] if any frame is larger than the cell.
pub fn compose(plan: &AtlasPlan, frames: &[Frame]) -> AtlasResult<RgbaImage> {
    if frames.len() != plan.frame_count {
        return Err(AtlasError::invalid_configuration(format!(
            "plan lays out {} frames but {} were given",
            plan.frame_count,
            frames.len()
        )));
    }

    for (i, frame) in frames.iter().enumerate() {
        if frame.width() > plan.cell_width || frame.height() > plan.cell_height {
            return Err(AtlasError::LayoutInvariant {
                index: i,
                frame_width: frame.width(),
                frame_height: frame.height(),
                cell_width: plan.cell_width,
                cell_height: plan.cell_height,
            });
        }
    }

    let mut canvas = RgbaImage::from_pixel(plan.canvas_width, plan.canvas_height, TRANSPARENT);

    for (i, frame) in frames.iter().enumerate() {
        let (x, y) = plan.cell_origin(i);
        imageops::replace(&mut canvas, frame.image(), i64::from(x), i64::from(y));
    }

    debug!(
        frames = frames.len(),
        width = plan.canvas_width,
        height = plan.canvas_height,
        "composed atlas"
    );
    Ok(canvas)
}
