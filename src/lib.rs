//! animatlas - Library for turning animated images into sprite-sheet atlases
//!
//! This library provides functionality to:
//! - Decode every frame of a GIF or APNG (or a still image) into RGBA
//! - Plan a uniform grid sized to the largest frame
//! - Compose the frames onto a transparent canvas in row-major order
//! - Write the atlas as a lossless PNG, optionally with a JSON sidecar
//! - Batch-convert the inputs listed in an `atlas.toml`

pub mod build;
pub mod cli;
pub mod compose;
pub mod config;
pub mod convert;
pub mod encode;
pub mod error;
pub mod frames;
pub mod layout;
pub mod metadata;

pub use convert::{convert_file, ConversionReport, Converter};
pub use error::{AtlasError, AtlasResult};
