//! Shared library for al-ranked.
//!
//! This crate provides common functionality used by the ranking tool:
//! - Configuration management
//! - Media and ranking models
//! - Output path utilities
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::{CategoryConfig, Config, PagingConfig};
pub use logging::LogConfig;
pub use models::*;
pub use paths::OutputPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
