//! Probe module: the concurrent request pipeline
//!
//! This module contains:
//! - Request enumeration over prefixes × suffixes
//! - Per-host rate limiting
//! - HTTP request execution
//! - The worker pool and the coordinator that sequences shutdown

mod coordinator;
mod enumerate;
mod executor;
mod rate_limiter;
mod request;
mod worker;

pub use crate::output::ProbeSummary;
pub use coordinator::{run_probe, Coordinator};
pub use enumerate::enumerate;
pub use executor::{build_http_client, Executor};
pub use rate_limiter::RateLimiter;
pub use request::{split_header, ProbeRequest, ProbeResponse};
pub use worker::{RequestSource, Worker};
