//! Run statistics
//!
//! Counters collected while a run is in progress and reported when it ends.

use std::fmt;

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    /// Requests handed to the worker pool
    pub requests_sent: u64,

    /// Responses that reached the sink
    pub responses_received: u64,

    /// Responses written to the index log
    pub saved: u64,

    /// Responses dropped by the savestatus filter
    pub filtered: u64,

    /// Bodies that could not be written to disk
    pub persist_failures: u64,

    /// Requests that never received an HTTP response
    pub transport_failures: u64,
}

impl fmt::Display for ProbeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests, {} responses, {} saved, {} filtered, {} save failures, {} transport failures",
            self.requests_sent,
            self.responses_received,
            self.saved,
            self.filtered,
            self.persist_failures,
            self.transport_failures
        )
    }
}
