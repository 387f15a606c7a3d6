//! Configuration module for batch atlas builds
//!
//! Provides types and parsing for `atlas.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
