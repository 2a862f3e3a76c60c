use crate::config::validation::validate;
use crate::ConfigResult;
use serde::Deserialize;
use std::time::Duration;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Default minimum gap between requests to the same host (milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 5000;

/// Default HTTP method
pub const DEFAULT_METHOD: &str = "GET";

/// Default transport timeout for a single request (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Number of workers issuing requests
    pub concurrency: usize,

    /// Minimum time between requests to the same host (milliseconds)
    pub delay_ms: u64,

    /// HTTP method sent with every request
    pub method: String,

    /// Extra headers, each formatted as `Name: value`
    pub headers: Vec<String>,

    /// Only keep responses with this status code; 0 keeps everything
    pub save_status: u16,

    /// Echo index lines to stdout
    pub verbose: bool,

    /// Transport timeout for a single request (milliseconds)
    pub timeout_ms: u64,

    /// Accept TLS certificates that fail verification
    pub accept_invalid_certs: bool,
}

impl ProbeConfig {
    /// Minimum gap between requests to the same host
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Per-request transport timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns true if `status` passes the savestatus filter
    pub fn keeps_status(&self, status: u16) -> bool {
        self.save_status == 0 || self.save_status == status
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            delay_ms: DEFAULT_DELAY_MS,
            method: DEFAULT_METHOD.to_string(),
            headers: Vec::new(),
            save_status: 0,
            verbose: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            accept_invalid_certs: true,
        }
    }
}

/// Top-level layout of a TOML settings file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub probe: ProbeSettings,
}

/// A partial set of run settings
///
/// Used both for the `[probe]` table of a settings file and for the values
/// given on the command line. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProbeSettings {
    pub concurrency: Option<usize>,
    pub delay: Option<u64>,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    pub savestatus: Option<u16>,
    pub verbose: Option<bool>,
    pub timeout: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
}

impl ProbeSettings {
    /// Layers `self` over `lower`; fields set in `self` win.
    ///
    /// Headers accumulate: `lower`'s headers are sent first.
    pub fn merge(self, lower: ProbeSettings) -> ProbeSettings {
        let mut headers = lower.headers;
        headers.extend(self.headers);

        ProbeSettings {
            concurrency: self.concurrency.or(lower.concurrency),
            delay: self.delay.or(lower.delay),
            method: self.method.or(lower.method),
            headers,
            savestatus: self.savestatus.or(lower.savestatus),
            verbose: self.verbose.or(lower.verbose),
            timeout: self.timeout.or(lower.timeout),
            accept_invalid_certs: self.accept_invalid_certs.or(lower.accept_invalid_certs),
        }
    }

    /// Fills remaining gaps with defaults and validates the result
    pub fn resolve(self) -> ConfigResult<ProbeConfig> {
        let defaults = ProbeConfig::default();
        let config = ProbeConfig {
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            delay_ms: self.delay.unwrap_or(defaults.delay_ms),
            method: self.method.unwrap_or(defaults.method),
            headers: self.headers,
            save_status: self.savestatus.unwrap_or(defaults.save_status),
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout_ms: self.timeout.unwrap_or(defaults.timeout_ms),
            accept_invalid_certs: self
                .accept_invalid_certs
                .unwrap_or(defaults.accept_invalid_certs),
        };

        validate(&config)?;
        Ok(config)
    }
}
