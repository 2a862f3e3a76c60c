//! meg main entry point
//!
//! This is the command-line interface for meg.

use anyhow::Context;
use clap::Parser;
use meg::config::{load_settings, ProbeConfig, ProbeSettings};
use meg::input::{
    ensure_output_dir, open_index, read_prefixes, resolve_suffixes, DEFAULT_OUTPUT_DIR,
    DEFAULT_PREFIX_FILE, DEFAULT_SUFFIX_ARG,
};
use meg::output::ResponseSink;
use meg::probe::run_probe;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// meg: request many paths (suffixes) for many hosts (prefixes)
///
/// Every suffix is requested from every prefix, with at most one request per
/// host every DELAY milliseconds. Responses are saved under OUTPUT_DIR and
/// listed in OUTPUT_DIR/index.
#[derive(Parser, Debug)]
#[command(name = "meg")]
#[command(version)]
#[command(about = "Request many paths for many hosts", long_about = None)]
struct Cli {
    /// A single suffix, or a file with one suffix per line
    #[arg(value_name = "SUFFIX|SUFFIX_FILE", default_value = DEFAULT_SUFFIX_ARG)]
    suffix: String,

    /// File with one prefix per line
    #[arg(value_name = "PREFIX_FILE", default_value = DEFAULT_PREFIX_FILE)]
    prefix_file: PathBuf,

    /// Directory to save responses in
    #[arg(value_name = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Number of concurrent workers [default: 20]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Milliseconds between requests to the same host [default: 5000]
    #[arg(short, long, value_name = "MILLIS")]
    delay: Option<u64>,

    /// Send a custom HTTP header (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// HTTP method [default: GET]
    #[arg(short = 'X', long, value_name = "METHOD")]
    method: Option<String>,

    /// Save only responses with this status code
    #[arg(short, long, value_name = "STATUS")]
    savestatus: Option<u16>,

    /// Print each index line to stdout
    #[arg(short, long, overrides_with = "no_verbose")]
    verbose: bool,

    /// Do not print index lines, even if the settings file enables it
    #[arg(long, overrides_with = "verbose")]
    no_verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Per-request timeout in milliseconds [default: 10000]
    #[arg(long, value_name = "MILLIS")]
    timeout: Option<u64>,

    /// Reject TLS certificates that fail verification
    #[arg(long, overrides_with = "no_verify_certs")]
    verify_certs: bool,

    /// Accept TLS certificates that fail verification [default]
    #[arg(long, overrides_with = "verify_certs")]
    no_verify_certs: bool,

    /// TOML file with default settings in a [probe] table
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Settings given explicitly on the command line
    fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            concurrency: self.concurrency,
            delay: self.delay,
            method: self.method.clone(),
            headers: self.headers.clone(),
            savestatus: self.savestatus,
            verbose: flag_pair(self.verbose, self.no_verbose),
            timeout: self.timeout,
            accept_invalid_certs: flag_pair(self.no_verify_certs, self.verify_certs),
        }
    }

    /// Layers the command line over the optional settings file
    fn resolve_config(&self) -> Result<ProbeConfig, meg::ConfigError> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from: {}", path.display());
                load_settings(path)?
            }
            None => ProbeSettings::default(),
        };

        self.settings().merge(file).resolve()
    }
}

/// Maps a `--flag`/`--no-flag` pair to an explicit setting, if either was given
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// Logs go to stderr so stdout only carries index lines in verbose mode.
/// `RUST_LOG` overrides the default filter.
fn setup_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meg=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Checks every input, then runs the probe
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config().context("invalid settings")?;

    let suffixes = resolve_suffixes(&cli.suffix)?;
    let prefixes = read_prefixes(&cli.prefix_file)?;
    ensure_output_dir(&cli.output_dir)?;
    let index = open_index(&cli.output_dir)?;

    tracing::debug!("Resolved settings: {:?}", config);

    let sink = ResponseSink::new(&cli.output_dir, index, &config);
    run_probe(config, &prefixes, &suffixes, sink).await?;

    Ok(())
}
