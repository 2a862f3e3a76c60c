//! Request and response values passed through the pipeline

use std::sync::Arc;
use url::Url;

/// One HTTP request to send
///
/// Created once by the enumerator and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// HTTP method, e.g. `GET`
    pub method: String,

    /// Full target URL (prefix + suffix)
    pub url: Url,

    /// Extra headers, each formatted as `Name: value`, sent in order
    pub headers: Arc<[String]>,
}

impl ProbeRequest {
    /// Host used as the rate-limiting key
    ///
    /// The port is not part of the key, so `a.com:80` and `a.com:8080`
    /// share one slot.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }
}

/// The outcome of executing a [`ProbeRequest`]
///
/// `status_code == 0` with `error` set means the request never completed at
/// the transport level. Otherwise `status_code` and `status` are what the
/// server returned.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub request: ProbeRequest,

    /// Status text, e.g. `200 OK`; empty when no response arrived
    pub status: String,

    pub status_code: u16,

    /// Response headers formatted as `name: value`, in received order
    pub headers: Vec<String>,

    /// Entire response body
    pub body: Vec<u8>,

    /// Transport failure description, if any
    pub error: Option<String>,
}

impl ProbeResponse {
    /// A response for a request that never reached a server
    pub fn failed(request: ProbeRequest, error: impl Into<String>) -> Self {
        Self {
            request,
            status: String::new(),
            status_code: 0,
            headers: Vec::new(),
            body: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Returns true if no HTTP response was received
    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0 && self.error.is_some()
    }
}

/// Splits a `Name: value` header at the first colon
///
/// Both parts are trimmed. Returns `None` when there is no colon or the name
/// is empty.
pub fn split_header(header: &str) -> Option<(&str, &str)> {
    let (name, value) = header.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}
