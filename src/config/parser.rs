use crate::config::types::{FileConfig, ProbeSettings};
use crate::ConfigError;
use std::path::Path;

/// Loads the `[probe]` table from a TOML settings file
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(ProbeSettings)` - The settings given in the file (unset keys stay `None`)
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_settings(path: &Path) -> Result<ProbeSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        what: "config file",
        path: path.to_path_buf(),
        source,
    })?;

    parse_settings(&content)
}

/// Parses settings from TOML text
pub fn parse_settings(content: &str) -> Result<ProbeSettings, ConfigError> {
    let file: FileConfig = toml::from_str(content)?;
    Ok(file.probe)
}
