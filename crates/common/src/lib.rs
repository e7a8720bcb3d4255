//! Montage Common Utilities
//!
//! Shared infrastructure for all Montage crates:
//! - Error types and result aliases
//! - Tick/pacing utilities for playback and polling loops
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod tick;

pub use config::*;
pub use error::*;
pub use tick::*;
