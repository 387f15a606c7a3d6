//! Atlas grid layout
//!
//! Computes the uniform-cell grid geometry for a frame sequence. Every cell is
//! as large as the largest frame in each dimension; frames are assigned to
//! cells in row-major order (left to right, top to bottom).

use serde::Serialize;

use crate::error::{AtlasError, AtlasResult};
use crate::frames::Frame;

/// Grid geometry for one atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasPlan {
    /// Number of frames laid out
    pub frame_count: usize,
    /// Grid columns (caller supplied)
    pub columns: u32,
    /// Grid rows, `ceil(frame_count / columns)`
    pub rows: u32,
    /// Width of every cell (largest frame width)
    pub cell_width: u32,
    /// Height of every cell (largest frame height)
    pub cell_height: u32,
    /// `columns * cell_width`
    pub canvas_width: u32,
    /// `rows * cell_height`
    pub canvas_height: u32,
}

impl AtlasPlan {
    /// Compute the plan from frame count, column count and the largest frame size.
    ///
    /// # Errors
    ///
    /// * [`AtlasError::InvalidConfiguration`] if `columns` is zero, a cell
    ///   dimension is zero, or the canvas would not fit in `u32` pixels.
    /// * [`AtlasError::EmptyAnimation`] if `frame_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use animatlas::layout::AtlasPlan;
    ///
    /// let plan = AtlasPlan::new(7, 5, 32, 32).unwrap();
    /// assert_eq!(plan.rows, 2);
    /// assert_eq!(plan.canvas_width, 160);
    /// assert_eq!(plan.canvas_height, 64);
    /// assert_eq!(plan.cell_origin(6), (32, 32));
    /// ```
    pub fn new(
        frame_count: usize,
        columns: u32,
        max_frame_width: u32,
        max_frame_height: u32,
    ) -> AtlasResult<Self> {
        check_columns(columns)?;
        if frame_count == 0 {
            return Err(AtlasError::EmptyAnimation { path: Default::default() });
        }
        if max_frame_width == 0 || max_frame_height == 0 {
            return Err(AtlasError::invalid_configuration(format!(
                "frames must have non-zero size, largest is {}x{}",
                max_frame_width, max_frame_height
            )));
        }

        let count = u32::try_from(frame_count).map_err(|_| {
            AtlasError::invalid_configuration(format!("too many frames: {}", frame_count))
        })?;
        let rows = count.div_ceil(columns);

        let overflow = || {
            AtlasError::invalid_configuration(format!(
                "atlas of {}x{} cells of {}x{} exceeds the maximum image size",
                columns, rows, max_frame_width, max_frame_height
            ))
        };
        let canvas_width = columns.checked_mul(max_frame_width).ok_or_else(overflow)?;
        let canvas_height = rows.checked_mul(max_frame_height).ok_or_else(overflow)?;

        Ok(Self {
            frame_count,
            columns,
            rows,
            cell_width: max_frame_width,
            cell_height: max_frame_height,
            canvas_width,
            canvas_height,
        })
    }

    /// Compute the plan for a decoded frame sequence.
    pub fn for_frames(frames: &[Frame], columns: u32) -> AtlasResult<Self> {
        let max_width = frames.iter().map(Frame::width).max().unwrap_or(0);
        let max_height = frames.iter().map(Frame::height).max().unwrap_or(0);
        Self::new(frames.len(), columns, max_width, max_height)
    }

    /// Cell `(column, row)` assigned to the frame at `index`.
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        cell_assignment(index, self.columns)
    }

    /// Pixel origin of the cell assigned to the frame at `index`.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let (col, row) = self.cell_of(index);
        (col * self.cell_width, row * self.cell_height)
    }

    /// Total number of cells in the grid (occupied or not).
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Row-major cell assignment: `index -> (index % columns, index / columns)`.
///
/// `columns` must be at least 1.
pub fn cell_assignment(index: usize, columns: u32) -> (u32, u32) {
    let columns = columns as usize;
    ((index % columns) as u32, (index / columns) as u32)
}

/// Reject a column count below 1.
pub fn check_columns(columns: u32) -> AtlasResult<()> {
    if columns < 1 {
        return Err(AtlasError::invalid_configuration(format!(
            "columns must be at least 1, got {}",
            columns
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::collections::HashSet;

    #[test]
    fn test_seven_frames_five_columns() {
        let plan = AtlasPlan::new(7, 5, 32, 32).unwrap();
        assert_eq!(plan.rows, 2);
        assert_eq!(plan.canvas_width, 160);
        assert_eq!(plan.canvas_height, 64);
        assert_eq!(plan.cell_origin(5), (0, 32));
        assert_eq!(plan.cell_origin(6), (32, 32));
        assert_eq!(plan.cell_count(), 10);
    }

    #[test]
    fn test_rows_use_ceiling_division() {
        for frames in 1..=40usize {
            for columns in 1..=12u32 {
                let plan = AtlasPlan::new(frames, columns, 3, 2).unwrap();
                let expected_rows = (frames as u32 + columns - 1) / columns;
                assert_eq!(plan.rows, expected_rows, "f={} c={}", frames, columns);
                assert_eq!(plan.canvas_width, columns * 3);
                assert_eq!(plan.canvas_height, expected_rows * 2);
                assert!(plan.cell_count() >= frames);
                assert!(plan.cell_count() - frames < columns as usize);
            }
        }
    }

    #[test]
    fn test_cell_assignment_row_major_and_unique() {
        for columns in 1..=7u32 {
            let plan = AtlasPlan::new(23, columns, 1, 1).unwrap();
            let mut seen = HashSet::new();
            for i in 0..23usize {
                let (col, row) = plan.cell_of(i);
                assert_eq!(col, i as u32 % columns);
                assert_eq!(row, i as u32 / columns);
                assert!(col < plan.columns && row < plan.rows);
                assert!(seen.insert((col, row)), "cell reused for index {}", i);
            }
        }
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = AtlasPlan::new(0, 5, 32, 32).unwrap_err();
        assert!(matches!(err, AtlasError::EmptyAnimation { .. }));
    }

    #[test]
    fn test_zero_columns_rejected() {
        let err = AtlasPlan::new(4, 0, 32, 32).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfiguration(_)));
        // Columns are checked before the frame count
        let err = AtlasPlan::new(0, 0, 32, 32).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_sized_cells_rejected() {
        assert!(AtlasPlan::new(3, 2, 0, 8).is_err());
        assert!(AtlasPlan::new(3, 2, 8, 0).is_err());
    }

    #[test]
    fn test_canvas_overflow_rejected() {
        let err = AtlasPlan::new(2, 2, u32::MAX, 1).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_for_frames_uses_largest_dimensions() {
        let frames = vec![
            Frame::new(0, RgbaImage::new(16, 16)),
            Frame::new(1, RgbaImage::new(32, 32)),
            Frame::new(2, RgbaImage::new(16, 16)),
        ];
        let plan = AtlasPlan::for_frames(&frames, 2).unwrap();
        assert_eq!((plan.cell_width, plan.cell_height), (32, 32));
        assert_eq!(plan.rows, 2);
        assert_eq!((plan.canvas_width, plan.canvas_height), (64, 64));
    }

    #[test]
    fn test_for_frames_mixed_aspect() {
        // Cell takes max width and max height independently
        let frames = vec![
            Frame::new(0, RgbaImage::new(40, 10)),
            Frame::new(1, RgbaImage::new(12, 30)),
        ];
        let plan = AtlasPlan::for_frames(&frames, 1).unwrap();
        assert_eq!((plan.cell_width, plan.cell_height), (40, 30));
        assert_eq!((plan.canvas_width, plan.canvas_height), (40, 60));
    }

    #[test]
    fn test_more_columns_than_frames() {
        let plan = AtlasPlan::new(3, 10, 2, 2).unwrap();
        assert_eq!(plan.rows, 1);
        assert_eq!(plan.canvas_width, 20);
        assert_eq!(plan.canvas_height, 2);
    }
}
