//! meg: fetch many paths for many hosts
//!
//! This crate requests the cross product of host prefixes and path suffixes,
//! spacing requests to the same host, and stores every retained response on
//! disk alongside an append-only index.

pub mod config;
pub mod input;
pub mod output;
pub mod probe;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for meg operations
#[derive(Debug, Error)]
pub enum MegError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
///
/// Every variant is fatal and is raised before the first request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open {what} {path}: {source}")]
    Io {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failure to write a response body to disk
#[derive(Debug, Error)]
#[error("failed to save {path}: {source}")]
pub struct PersistError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Result type alias for meg operations
pub type Result<T> = std::result::Result<T, MegError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ProbeConfig;
pub use output::{derive_path, ResponseSink};
pub use probe::{enumerate, run_probe, Executor, ProbeRequest, ProbeResponse, ProbeSummary, RateLimiter};
