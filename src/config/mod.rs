//! Configuration module for meg
//!
//! Run settings come from three layers, highest precedence first: command-line
//! flags, an optional TOML file, and built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use meg::config::{load_settings, ProbeSettings};
//! use std::path::Path;
//!
//! let file = load_settings(Path::new("meg.toml")).unwrap();
//! let config = ProbeSettings::default().merge(file).resolve().unwrap();
//! println!("Probing with {} workers", config.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    FileConfig, ProbeConfig, ProbeSettings, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS,
    DEFAULT_METHOD, DEFAULT_TIMEOUT_MS,
};

// Re-export parser functions
pub use parser::{load_settings, parse_settings};
pub use validation::validate;
