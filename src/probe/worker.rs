//! Worker pool member
//!
//! All workers run the same loop over shared handles: take a request, wait
//! for its host's slot, execute it, hand the response to the sink.

use crate::probe::executor::Executor;
use crate::probe::rate_limiter::RateLimiter;
use crate::probe::request::{ProbeRequest, ProbeResponse};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Receiving end of the request conduit, shared by every worker
pub type RequestSource = Arc<Mutex<mpsc::Receiver<ProbeRequest>>>;

/// One member of the worker pool
pub struct Worker {
    id: usize,
    requests: RequestSource,
    limiter: Arc<RateLimiter>,
    executor: Arc<Executor>,
    responses: mpsc::Sender<ProbeResponse>,
}

impl Worker {
    pub fn new(
        id: usize,
        requests: RequestSource,
        limiter: Arc<RateLimiter>,
        executor: Arc<Executor>,
        responses: mpsc::Sender<ProbeResponse>,
    ) -> Self {
        Self {
            id,
            requests,
            limiter,
            executor,
            responses,
        }
    }

    /// Runs until the request source is closed and drained
    ///
    /// Returns the number of responses handed to the sink.
    pub async fn run(self) -> usize {
        let mut handled = 0;

        loop {
            let next = { self.requests.lock().await.recv().await };
            let Some(request) = next else {
                break;
            };

            self.limiter.block(request.host()).await;

            tracing::debug!("Worker {} requesting {}", self.id, request.url);
            let response = self.executor.execute(request).await;

            if self.responses.send(response).await.is_err() {
                tracing::warn!("Worker {}: response sink closed early", self.id);
                break;
            }
            handled += 1;
        }

        tracing::trace!("Worker {} finished after {} requests", self.id, handled);
        handled
    }
}
