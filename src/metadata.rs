//! JSON sidecar describing an atlas grid.
//!
//! Lets a game runtime read the grid geometry and per-frame timing instead
//! of hard-coding cell sizes and column counts.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "image": "player.png",
//!   "size": [120, 48],
//!   "cell": [24, 24],
//!   "columns": 5,
//!   "rows": 2,
//!   "frames": [
//!     { "index": 0, "cell": [0, 0], "x": 0, "y": 0, "w": 24, "h": 24, "delay_ms": 100 }
//!   ]
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encode::{stage, StagedFile};
use crate::error::AtlasResult;
use crate::frames::Frame;
use crate::layout::AtlasPlan;

/// Atlas-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasMetadata {
    /// File name of the atlas image
    pub image: String,
    /// Canvas dimensions `[width, height]`
    pub size: [u32; 2],
    /// Cell dimensions `[width, height]`
    pub cell: [u32; 2],
    pub columns: u32,
    pub rows: u32,
    /// One entry per frame, in sequence order
    pub frames: Vec<FrameEntry>,
}

/// Placement of one frame inside the atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub index: usize,
    /// Grid position `[column, row]`
    pub cell: [u32; 2],
    pub x: u32,
    pub y: u32,
    /// Frame width (may be smaller than the cell)
    pub w: u32,
    /// Frame height (may be smaller than the cell)
    pub h: u32,
    pub delay_ms: u32,
}

impl AtlasMetadata {
    /// Describe a composed atlas.
    pub fn new(image: impl Into<String>, plan: &AtlasPlan, frames: &[Frame]) -> Self {
        let frames = frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let (col, row) = plan.cell_of(i);
                let (x, y) = plan.cell_origin(i);
                FrameEntry {
                    index: i,
                    cell: [col, row],
                    x,
                    y,
                    w: frame.width(),
                    h: frame.height(),
                    delay_ms: frame.delay_ms(),
                }
            })
            .collect();

        Self {
            image: image.into(),
            size: [plan.canvas_width, plan.canvas_height],
            cell: [plan.cell_width, plan.cell_height],
            columns: plan.columns,
            rows: plan.rows,
            frames,
        }
    }

    /// Total animation length in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.delay_ms)).sum()
    }

    /// Serialize as pretty-printed JSON into a [`StagedFile`] for `path`.
    pub fn stage(&self, path: &Path) -> AtlasResult<StagedFile> {
        stage(path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, self).map_err(|e| e.to_string())?;
            writer.write_all(b"\n").map_err(|e| e.to_string())
        })
    }

    /// Write as pretty-printed JSON, replacing any existing file.
    pub fn write(&self, path: &Path) -> AtlasResult<()> {
        self.stage(path)?.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::tempdir;

    fn frames() -> Vec<Frame> {
        vec![
            Frame::new(0, RgbaImage::new(24, 24)).with_delay_ms(100),
            Frame::new(1, RgbaImage::new(16, 20)).with_delay_ms(50),
            Frame::new(2, RgbaImage::new(24, 24)).with_delay_ms(100),
        ]
    }

    #[test]
    fn test_metadata_describes_grid() {
        let frames = frames();
        let plan = AtlasPlan::for_frames(&frames, 2).unwrap();
        let meta = AtlasMetadata::new("player.png", &plan, &frames);

        assert_eq!(meta.size, [48, 48]);
        assert_eq!(meta.cell, [24, 24]);
        assert_eq!((meta.columns, meta.rows), (2, 2));
        assert_eq!(meta.frames.len(), 3);
        assert_eq!(
            meta.frames[1],
            FrameEntry { index: 1, cell: [1, 0], x: 24, y: 0, w: 16, h: 20, delay_ms: 50 }
        );
        assert_eq!(meta.frames[2].cell, [0, 1]);
        assert_eq!((meta.frames[2].x, meta.frames[2].y), (0, 24));
        assert_eq!(meta.total_duration_ms(), 250);
    }

    #[test]
    fn test_metadata_written_as_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("player.json");
        let frames = frames();
        let plan = AtlasPlan::for_frames(&frames, 5).unwrap();
        let meta = AtlasMetadata::new("player.png", &plan, &frames);
        meta.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["image"], "player.png");
        assert_eq!(value["columns"], 5);
        assert_eq!(value["rows"], 1);
        assert_eq!(value["frames"][2]["x"], 48);

        let parsed: AtlasMetadata = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, meta);
    }
}
