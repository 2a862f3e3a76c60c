//! HTTP request execution
//!
//! This module turns a [`ProbeRequest`] into a [`ProbeResponse`]:
//! - Building the shared HTTP client from run settings
//! - Sending one request with the configured method and headers
//! - Capturing status, headers and the full body
//! - Folding transport failures into the response value
//!
//! There is no retry; each request gets a single attempt.

use crate::config::ProbeConfig;
use crate::probe::request::{split_header, ProbeRequest, ProbeResponse};
use reqwest::{redirect::Policy, Client, Method};

/// User agent sent unless the request overrides it with a header
const USER_AGENT: &str = concat!("meg/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed, so a 3xx is recorded as-is.
///
/// # Example
///
/// ```no_run
/// use meg::config::ProbeConfig;
/// use meg::probe::build_http_client;
///
/// let client = build_http_client(&ProbeConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout())
        .redirect(Policy::none())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends requests over a shared client
#[derive(Debug, Clone)]
pub struct Executor {
    client: Client,
}

impl Executor {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from run settings
    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Executes one request
    ///
    /// Never fails: connection errors, timeouts and TLS failures come back as a
    /// response with `status_code == 0` and `error` set. The body is read to
    /// completion and held in memory.
    pub async fn execute(&self, request: ProbeRequest) -> ProbeResponse {
        let method = match Method::from_bytes(request.method.as_bytes()) {
            Ok(m) => m,
            Err(e) => {
                let error = format!("invalid method '{}': {}", request.method, e);
                return ProbeResponse::failed(request, error);
            }
        };

        let mut builder = self.client.request(method, request.url.clone());
        for header in request.headers.iter() {
            match split_header(header) {
                Some((name, value)) => builder = builder.header(name, value),
                None => tracing::warn!("Ignoring malformed header '{}'", header),
            }
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Request to {} failed: {}", request.url, e);
                return ProbeResponse::failed(request, classify_error(&e));
            }
        };

        let status = response.status();
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
            })
            .collect();

        let (body, error) = match response.bytes().await {
            Ok(bytes) => (bytes.to_vec(), None),
            Err(e) => {
                tracing::debug!("Reading body from {} failed: {}", request.url, e);
                (Vec::new(), Some(classify_error(&e)))
            }
        };

        ProbeResponse {
            request,
            status: status_line,
            status_code: status.as_u16(),
            headers,
            body,
            error,
        }
    }
}

/// Describes a transport error for the response record
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timeout: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
