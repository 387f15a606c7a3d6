//! Batch conversion driven by `atlas.toml`
//!
//! Provides the build system for turning a project's raw animations into
//! atlas textures in one run.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: Expand the configured input paths and glob patterns
//! - **Planning**: One target per input, each with its own output path
//! - **Execution**: Convert targets sequentially or on a worker pool
//!
//! # Example
//!
//! ```ignore
//! use animatlas::build::{load_context, BuildPipeline};
//! use animatlas::config::CliOverrides;
//!
//! let context = load_context(None, &CliOverrides::default())?;
//! let result = BuildPipeline::new(context).build()?;
//! println!("{}", result.summary());
//! ```

pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod result;
pub mod target;

pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use result::*;
pub use target::*;
