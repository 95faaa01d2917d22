//! Document loading and load errors.
//!
//! Reading bytes is the only fallible part of the pipeline. Once a document
//! parses as JSON, every later stage degrades gracefully instead of failing.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Fixed resource name published next to the viewer.
pub const LATEST_RESOURCE: &str = "latest.json";

/// Deepest array/object nesting accepted by [`parse_document`].
pub const MAX_NESTING_DEPTH: usize = 1_000;

/// Errors raised while obtaining a document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File or stdin I/O failure.
    #[error("failed to read '{source_name}': {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// The bytes are not valid JSON. No partial document is used.
    #[error("failed to parse JSON (the file may be corrupt or not an export): {0}")]
    Json(#[from] serde_json::Error),

    /// Valid or not, the input nests containers deeper than supported.
    #[error("JSON nesting deeper than {limit} levels is not supported")]
    TooDeep { limit: usize },

    /// The server answered with a non-success status.
    #[error("fetching {url} failed: HTTP {status}; republish latest.json and try again")]
    Http { url: String, status: u16 },

    /// The request never produced a response.
    #[error("fetching {url} failed: {detail}; check the address and network connection")]
    Network { url: String, detail: String },
}

/// Parses raw bytes as one JSON document.
///
/// serde_json's built-in recursion limit is lifted; recursion runs on a
/// stack that `serde_stacker` grows on demand, so any nesting up to
/// [`MAX_NESTING_DEPTH`] parses.
///
/// # Errors
///
/// Returns [`LoadError::TooDeep`] when containers nest deeper than
/// [`MAX_NESTING_DEPTH`], or [`LoadError::Json`] when the input is not
/// valid JSON.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::load::{LoadError, parse_document};
///
/// assert!(parse_document(br#"{"keys": {}}"#).is_ok());
/// assert!(matches!(parse_document(b"{not json"), Err(LoadError::Json(_))));
///
/// let deep = format!("{}{}", "[".repeat(300), "]".repeat(300));
/// assert!(parse_document(deep.as_bytes()).is_ok());
/// ```
pub fn parse_document(bytes: &[u8]) -> Result<Value, LoadError> {
    if nesting_exceeds(bytes, MAX_NESTING_DEPTH) {
        return Err(LoadError::TooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Whether brackets outside string literals nest deeper than `limit`.
fn nesting_exceeds(bytes: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Reads and parses a local file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or
/// [`LoadError::Json`] if it is not valid JSON.
pub fn read_document(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|error| LoadError::Io {
        source_name: path.display().to_string(),
        error,
    })?;
    let value = parse_document(&bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Loaded document");
    Ok(value)
}

/// Reads a whole stream (e.g. stdin) and parses it.
///
/// # Errors
///
/// Returns [`LoadError::Io`] on read failure, labelled with
/// `source_name`, or [`LoadError::Json`] if the content is not valid JSON.
pub fn read_from(source_name: &str, mut reader: impl Read) -> Result<Value, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|error| LoadError::Io {
            source_name: source_name.to_string(),
            error,
        })?;
    parse_document(&bytes)
}
