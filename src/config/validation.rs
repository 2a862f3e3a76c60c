use crate::config::types::ProbeConfig;
use crate::probe::split_header;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

/// Validates resolved run settings
pub fn validate(config: &ProbeConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1ms".to_string(),
        ));
    }

    if Method::from_bytes(config.method.as_bytes()).is_err() {
        return Err(ConfigError::Validation(format!(
            "invalid HTTP method '{}'",
            config.method
        )));
    }

    for header in &config.headers {
        validate_header(header)?;
    }

    Ok(())
}

/// Validates a single `Name: value` header
fn validate_header(header: &str) -> Result<(), ConfigError> {
    let (name, value) = split_header(header).ok_or_else(|| {
        ConfigError::Validation(format!("header '{}' must be formatted as 'Name: value'", header))
    })?;

    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::Validation(format!("invalid header name in '{}'", header)))?;

    HeaderValue::from_str(value)
        .map_err(|_| ConfigError::Validation(format!("invalid header value in '{}'", header)))?;

    Ok(())
}
