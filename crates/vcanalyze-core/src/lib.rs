//! Core types, configuration, and error handling for vc-analyze.
//!
//! This crate provides the shared foundation used by the history engine and
//! the command-line front end:
//! - [`AnalyzeError`] — unified error type using `thiserror`
//! - [`AnalyzerConfig`] — configuration loaded from `.vc-analyze.toml`
//! - [`OutputFormat`] — how reports are rendered

mod config;
mod error;
mod types;

pub use config::{AnalyzerConfig, ThresholdConfig, CONFIG_FILE_NAME};
pub use error::AnalyzeError;
pub use types::OutputFormat;

/// A convenience `Result` type for vc-analyze operations.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
