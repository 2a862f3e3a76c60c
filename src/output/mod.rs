//! Output module for storing responses
//!
//! This module handles:
//! - Deriving a file path from each response URL
//! - Filtering responses by status code
//! - Writing response bodies under the output directory
//! - Appending to the index log

mod path;
mod sink;
pub mod stats;

pub use path::{derive_path, DIRECTORY_LEAF};
pub use sink::ResponseSink;
pub use stats::ProbeSummary;
