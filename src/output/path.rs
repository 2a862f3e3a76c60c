//! Output path derivation
//!
//! Maps a request URL to a relative file path under the output directory:
//! `<host>[_<port>]/<dir segments...>/<name>~<digest>`.
//!
//! Directory segments are escaped so they never contain `~`, while every file
//! name does, so a file can never take the place of a directory another URL
//! needs. The digest covers the full URL, so distinct URLs never share a file.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use url::Url;

/// Readable file name used when the URL path ends at a directory boundary
pub const DIRECTORY_LEAF: &str = "index";

/// Separates the readable part of a file name from its digest
const DIGEST_SEPARATOR: char = '~';

/// Longest readable part kept in a file name
const MAX_NAME_LEN: usize = 180;

/// Number of hex characters of the URL digest in a file name
const DIGEST_LEN: usize = 16;

/// Derives the relative storage path for a URL
///
/// # Examples
///
/// ```
/// use meg::output::derive_path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/app/").unwrap();
/// let path = derive_path(&url);
/// assert!(path.starts_with("example.com/app"));
/// assert!(path.file_name().unwrap().to_str().unwrap().starts_with("index~"));
/// ```
pub fn derive_path(url: &Url) -> PathBuf {
    let mut path = PathBuf::from(host_component(url));

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    let (leaf, dirs) = match segments.split_last() {
        Some((leaf, dirs)) => (*leaf, dirs),
        None => ("", &[][..]),
    };

    for dir in dirs {
        path.push(escape_segment(dir));
    }

    path.push(file_name(leaf, url));
    path
}

fn host_component(url: &Url) -> String {
    let host = escape(url.host_str().unwrap_or(""));
    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    }
}

/// Builds `<readable>~<digest>` for the last path segment
fn file_name(leaf: &str, url: &Url) -> String {
    let mut name = if leaf.is_empty() {
        DIRECTORY_LEAF.to_string()
    } else {
        escape(leaf)
    };

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        name.push('_');
        name.push_str(&escape(query));
    }

    let mut cut = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name.truncate(cut);

    let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
    format!("{}{}{}", name, DIGEST_SEPARATOR, &digest[..DIGEST_LEN])
}

/// Escapes a directory segment, including ones the file system would
/// swallow or treat as navigation
fn escape_segment(segment: &str) -> String {
    match segment {
        "" => "%".to_string(),
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        other => escape(other),
    }
}

/// Percent-escapes characters that are not portable in file names
///
/// `%` and the digest separator are escaped too, so the mapping is
/// reversible and the output never contains a bare separator.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' | '~' | '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => {
                escaped.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    escaped.push_str(&format!("%{:02X}", b));
                }
            }
            c => escaped.push(c),
        }
    }
    escaped
}
