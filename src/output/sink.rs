//! The single consumer of responses
//!
//! Only this type writes to the output directory and the index log, so the
//! log needs no further locking.

use crate::config::ProbeConfig;
use crate::output::path::derive_path;
use crate::output::stats::ProbeSummary;
use crate::probe::ProbeResponse;
use crate::PersistError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;

/// Filters, persists and indexes responses
pub struct ResponseSink {
    output_dir: PathBuf,
    index: BufWriter<File>,
    config: ProbeConfig,
    /// Where index lines are echoed in verbose mode; dropped after a failed write
    echo: Option<Box<dyn Write + Send>>,
    stats: ProbeSummary,
}

impl ResponseSink {
    /// Creates a sink writing under `output_dir`
    ///
    /// `index` must already be open for appending. In verbose mode index lines
    /// are echoed to stdout.
    pub fn new(output_dir: impl Into<PathBuf>, index: std::fs::File, config: &ProbeConfig) -> Self {
        let echo: Option<Box<dyn Write + Send>> = if config.verbose {
            Some(Box::new(std::io::stdout()))
        } else {
            None
        };

        Self {
            output_dir: output_dir.into(),
            index: BufWriter::new(File::from_std(index)),
            config: config.clone(),
            echo,
            stats: ProbeSummary::default(),
        }
    }

    /// Echoes index lines to `writer` instead of stdout
    pub fn with_echo(mut self, writer: impl Write + Send + 'static) -> Self {
        self.echo = Some(Box::new(writer));
        self
    }

    /// Drains `responses` until every sender is dropped, then flushes the index
    ///
    /// The index is flushed and closed on every return path. Returns the
    /// sink's counters; `requests_sent` is left at zero.
    pub async fn run(
        mut self,
        mut responses: mpsc::Receiver<ProbeResponse>,
    ) -> std::io::Result<ProbeSummary> {
        let mut result = Ok(());
        while let Some(response) = responses.recv().await {
            if let Err(e) = self.handle(response).await {
                tracing::error!("Failed to write index log: {}", e);
                result = Err(e);
                break;
            }
        }
        // Stop accepting responses before the final flush
        drop(responses);

        let closed = self.close_index().await;
        result.and(closed)?;
        Ok(self.stats)
    }

    async fn close_index(&mut self) -> std::io::Result<()> {
        self.index.flush().await?;
        self.index.shutdown().await?;
        tracing::debug!("Index log flushed and closed");
        Ok(())
    }

    /// Processes one response
    ///
    /// Returns the index line written, or `None` if the response was filtered.
    /// A body that fails to save is logged and still gets an index line.
    /// Only a failed index write is an error.
    pub async fn handle(&mut self, response: ProbeResponse) -> std::io::Result<Option<String>> {
        self.stats.responses_received += 1;
        if response.is_transport_failure() {
            self.stats.transport_failures += 1;
        }

        if !self.config.keeps_status(response.status_code) {
            tracing::trace!(
                "Discarding {} ({}): savestatus is {}",
                response.request.url,
                response.status_code,
                self.config.save_status
            );
            self.stats.filtered += 1;
            return Ok(None);
        }

        let path = self.output_dir.join(derive_path(&response.request.url));
        if let Err(e) = persist(&path, &response.body).await {
            tracing::error!("{}", e);
            self.stats.persist_failures += 1;
        }

        let line = format!(
            "{} {} ({})\n",
            path.display(),
            response.request.url,
            response.status
        );
        self.index.write_all(line.as_bytes()).await?;
        self.echo_line(&line);

        self.stats.saved += 1;
        Ok(Some(line))
    }

    /// Echoes a line in verbose mode; a broken echo only disables echoing
    fn echo_line(&mut self, line: &str) {
        let Some(echo) = self.echo.as_mut() else {
            return;
        };

        if let Err(e) = echo.write_all(line.as_bytes()).and_then(|()| echo.flush()) {
            tracing::warn!("Stopping verbose output: {}", e);
            self.echo = None;
        }
    }
}

/// Writes `body` to `path`, creating missing parent directories
async fn persist(path: &Path, body: &[u8]) -> Result<(), PersistError> {
    let wrap = |source: std::io::Error| PersistError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o750);
        builder.create(parent).await.map_err(wrap)?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o640);

    let mut file = options.open(path).await.map_err(wrap)?;
    file.write_all(body).await.map_err(wrap)?;
    file.flush().await.map_err(wrap)?;
    Ok(())
}
