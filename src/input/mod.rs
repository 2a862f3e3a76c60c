//! Input collaborators
//!
//! Plain file-system helpers used before any request is sent: reading the
//! prefix and suffix lists, creating the output directory and opening the
//! index log. Every failure here is a [`ConfigError`] and aborts the run.

use crate::ConfigError;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Suffix argument used when none is given on the command line
pub const DEFAULT_SUFFIX_ARG: &str = "suffixes";

/// Prefix file used when none is given on the command line
pub const DEFAULT_PREFIX_FILE: &str = "prefixes";

/// Output directory used when none is given on the command line
pub const DEFAULT_OUTPUT_DIR: &str = "./out";

/// Name of the index log inside the output directory
pub const INDEX_FILE_NAME: &str = "index";

/// Reads a newline-delimited file into its lines
///
/// Blank lines are kept as empty strings. A trailing newline does not add an
/// extra empty line, and a `\r` before each newline is stripped. Bytes that
/// are not valid UTF-8 are replaced rather than rejected.
pub fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read(path)?;
    Ok(split_lines(&content))
}

fn split_lines(content: &[u8]) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|b| *b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

/// Resolves the suffix argument into a list of suffixes
///
/// * An existing regular file is read line by line.
/// * Any other value is a single literal suffix, except the default name
///   [`DEFAULT_SUFFIX_ARG`], which yields no suffixes when no such file exists.
pub fn resolve_suffixes(arg: &str) -> Result<Vec<String>, ConfigError> {
    let path = Path::new(arg);
    let is_file = std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false);

    if is_file {
        return read_lines(path).map_err(|source| ConfigError::Io {
            what: "suffix file",
            path: path.to_path_buf(),
            source,
        });
    }

    if arg == DEFAULT_SUFFIX_ARG {
        tracing::debug!("No '{}' file found, no suffixes to request", arg);
        Ok(Vec::new())
    } else {
        Ok(vec![arg.to_string()])
    }
}

/// Reads the prefix file
pub fn read_prefixes(path: &Path) -> Result<Vec<String>, ConfigError> {
    read_lines(path).map_err(|source| ConfigError::Io {
        what: "prefix file",
        path: path.to_path_buf(),
        source,
    })
}

/// Creates the output directory and any missing parents
///
/// Succeeds if the directory already exists.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ConfigError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }

    builder.create(dir).map_err(|source| ConfigError::Io {
        what: "output directory",
        path: dir.to_path_buf(),
        source,
    })
}

/// Path of the index log inside `dir`
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE_NAME)
}

/// Opens the index log in `dir` for appending, creating it if needed
pub fn open_index(dir: &Path) -> Result<File, ConfigError> {
    let path = index_path(dir);
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(&path).map_err(|source| ConfigError::Io {
        what: "index file",
        path,
        source,
    })
}
