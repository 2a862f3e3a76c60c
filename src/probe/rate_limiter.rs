//! Per-host request spacing
//!
//! Every worker calls [`RateLimiter::block`] before sending a request. The
//! limiter keeps the next free dispatch slot for each host and hands slots out
//! under a short lock; the sleep itself happens after the lock is released, so
//! workers targeting other hosts are never held up.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Shared host → last dispatch time store
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum gap between two dispatches to the same host
    delay: Duration,

    /// Last reserved dispatch time per host; entries are never removed
    last_dispatch: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Creates a limiter enforcing `delay` between requests to one host
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_dispatch: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `host` may be sent
    ///
    /// The first request to a host never waits. Later requests are released
    /// no closer than `delay` after the previous one, even when many workers
    /// call this concurrently for the same host.
    pub async fn block(&self, host: &str) {
        if let Some(wait) = self.reserve(host, Instant::now()) {
            tracing::trace!("Delaying request to {} by {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Claims the next dispatch slot for `host`
    ///
    /// Returns how long the caller must wait for its slot, or `None` if it may
    /// go immediately. The slot is recorded before returning so concurrent
    /// callers queue up behind it.
    fn reserve(&self, host: &str, now: Instant) -> Option<Duration> {
        let mut last_dispatch = self
            .last_dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(last) = last_dispatch.get_mut(host) else {
            last_dispatch.insert(host.to_string(), now);
            return None;
        };

        let next = *last + self.delay;
        if next <= now {
            *last = now;
            None
        } else {
            *last = next;
            Some(next - now)
        }
    }

    /// Number of distinct hosts seen so far
    pub fn tracked_hosts(&self) -> usize {
        self.last_dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
