//! Error types for atlas conversion
//!
//! Every failure in the decode -> plan -> compose -> encode chain is reported
//! through [`AtlasError`]. None of these are retried: they are caller-visible
//! failures that abort the conversion of a single input.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience result type for conversion operations.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Error raised while converting an animation into an atlas.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AtlasError {
    /// The source image is malformed, truncated or uses an unsupported codec.
    #[error("Failed to decode {}{}: {source}", .path.display(), frame_suffix(.frame))]
    Decode {
        /// Input file being decoded
        path: PathBuf,
        /// Index of the frame being decoded when the error occurred, if known
        frame: Option<usize>,
        /// Underlying codec or I/O error
        #[source]
        source: image::ImageError,
    },

    /// The source decoded cleanly but contained no frames.
    #[error("Animation has no frames: {}", .path.display())]
    EmptyAnimation {
        /// Input file that produced zero frames
        path: PathBuf,
    },

    /// Conversion parameters are unusable (e.g. zero columns).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A frame does not fit the cell computed for it.
    #[error(
        "Frame {index} ({frame_width}x{frame_height}) does not fit atlas cell ({cell_width}x{cell_height})"
    )]
    LayoutInvariant {
        /// Sequence index of the offending frame
        index: usize,
        /// Frame width in pixels
        frame_width: u32,
        /// Frame height in pixels
        frame_height: u32,
        /// Cell width in pixels
        cell_width: u32,
        /// Cell height in pixels
        cell_height: u32,
    },

    /// The atlas could not be written.
    #[error("Failed to encode {}: {reason}", .path.display())]
    Encode {
        /// Destination path
        path: PathBuf,
        /// Why the write failed
        reason: String,
    },
}

fn frame_suffix(frame: &Option<usize>) -> String {
    match frame {
        Some(index) => format!(" (frame {})", index),
        None => String::new(),
    }
}

impl AtlasError {
    /// Build an [`AtlasError::InvalidConfiguration`] value.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build an [`AtlasError::Encode`] value.
    pub fn encode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Encode { path: path.into(), reason: reason.to_string() }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AtlasError::Decode { .. } => "decode",
            AtlasError::EmptyAnimation { .. } => "empty_animation",
            AtlasError::InvalidConfiguration(_) => "invalid_configuration",
            AtlasError::LayoutInvariant { .. } => "layout_invariant",
            AtlasError::Encode { .. } => "encode",
        }
    }
}
