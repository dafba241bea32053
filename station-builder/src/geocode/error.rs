//! Geocoding error types.

use std::path::PathBuf;

/// Errors from reverse-geocoding services and the label cache.
///
/// Service errors are logged by the resolver and count as "no vote"; they
/// never fail a resolution.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response did not have the expected shape
    #[error("unexpected {service} response: {message}")]
    Shape {
        service: &'static str,
        message: String,
    },

    /// Label cache file could not be read or written
    #[error("label cache {path}: {source}")]
    LabelsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Label cache file is not a flat JSON object
    #[error("label cache {path}: {source}")]
    LabelsJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}
