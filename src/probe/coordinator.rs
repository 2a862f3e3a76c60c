//! Probe coordinator - wires the pipeline and owns shutdown ordering
//!
//! The coordinator:
//! - Spawns the response sink and the worker pool
//! - Feeds enumerated requests into the request conduit
//! - Closes the request conduit once enumeration is done
//! - Waits for every worker, then closes the response conduit
//! - Waits for the sink to drain and close the index log

use crate::config::ProbeConfig;
use crate::output::{ProbeSummary, ResponseSink};
use crate::probe::enumerate::enumerate;
use crate::probe::executor::Executor;
use crate::probe::rate_limiter::RateLimiter;
use crate::probe::request::{ProbeRequest, ProbeResponse};
use crate::probe::worker::Worker;
use crate::MegError;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Capacity of each conduit; one slot keeps hand-offs close to synchronous
const CONDUIT_CAPACITY: usize = 1;

/// Owns everything needed for one run
pub struct Coordinator {
    config: ProbeConfig,
    executor: Arc<Executor>,
    limiter: Arc<RateLimiter>,
}

impl Coordinator {
    /// Creates a coordinator, building the HTTP client from `config`
    pub fn new(config: ProbeConfig) -> Result<Self, MegError> {
        let executor = Executor::from_config(&config)?;
        Ok(Self::with_executor(config, executor))
    }

    /// Creates a coordinator around an existing executor
    pub fn with_executor(config: ProbeConfig, executor: Executor) -> Self {
        let limiter = RateLimiter::new(config.delay());
        Self {
            config,
            executor: Arc::new(executor),
            limiter: Arc::new(limiter),
        }
    }

    /// Requests every prefix × suffix pair and stores the results
    ///
    /// Returns only after the sink has processed every response and closed
    /// the index log.
    pub async fn run(
        &self,
        prefixes: &[String],
        suffixes: &[String],
        sink: ResponseSink,
    ) -> Result<ProbeSummary, MegError> {
        let start_time = std::time::Instant::now();
        tracing::info!(
            "Probing {} prefixes x {} suffixes with {} workers",
            prefixes.len(),
            suffixes.len(),
            self.config.concurrency
        );

        let (request_tx, request_rx) = mpsc::channel::<ProbeRequest>(CONDUIT_CAPACITY);
        let (response_tx, response_rx) = mpsc::channel::<ProbeResponse>(CONDUIT_CAPACITY);
        let request_rx = Arc::new(Mutex::new(request_rx));

        let sink_task = tokio::spawn(sink.run(response_rx));

        let mut workers = JoinSet::new();
        for id in 0..self.config.concurrency {
            let worker = Worker::new(
                id,
                Arc::clone(&request_rx),
                Arc::clone(&self.limiter),
                Arc::clone(&self.executor),
                response_tx.clone(),
            );
            workers.spawn(worker.run());
        }
        // Workers hold the only remaining handles to the request receiver
        drop(request_rx);

        let headers: Arc<[String]> = Arc::from(self.config.headers.clone());
        let mut requests_sent = 0u64;
        for request in enumerate(prefixes, suffixes, &self.config.method, headers) {
            if request_tx.send(request).await.is_err() {
                tracing::error!("All workers exited before enumeration finished");
                break;
            }
            requests_sent += 1;
        }

        // No more requests; workers exit once the conduit is drained
        drop(request_tx);

        let mut handled = 0;
        while let Some(result) = workers.join_next().await {
            handled += result?;
        }
        tracing::debug!("All workers finished, {} responses forwarded", handled);

        // Last sender gone; the sink sees the end of the stream
        drop(response_tx);

        let mut summary = sink_task.await??;
        summary.requests_sent = requests_sent;

        tracing::info!(
            "Probe completed in {:?}: {} ({} hosts)",
            start_time.elapsed(),
            summary,
            self.limiter.tracked_hosts()
        );

        Ok(summary)
    }
}

/// Runs a complete probe
///
/// # Example
///
/// ```no_run
/// use meg::config::ProbeConfig;
/// use meg::input::open_index;
/// use meg::output::ResponseSink;
/// use meg::probe::run_probe;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ProbeConfig::default();
/// let out = Path::new("./out");
/// let sink = ResponseSink::new(out, open_index(out)?, &config);
/// let prefixes = vec!["https://example.com".to_string()];
/// let suffixes = vec!["/robots.txt".to_string()];
/// run_probe(config, &prefixes, &suffixes, sink).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_probe(
    config: ProbeConfig,
    prefixes: &[String],
    suffixes: &[String],
    sink: ResponseSink,
) -> Result<ProbeSummary, MegError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(prefixes, suffixes, sink).await
}
