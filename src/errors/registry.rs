//! Error types for the deployed-circle registry.

use std::path::PathBuf;

/// Errors that can occur while loading or fetching the circle address list.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The address list file could not be read.
    #[error("Failed to read circle list {}", path.display())]
    ReadFailed {
        /// Path of the address list file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The registry base URL could not be parsed.
    #[error("Invalid registry URL: {url}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
    },

    /// The HTTP request for the address list failed.
    #[error("Failed to fetch circle list: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry endpoint answered with a non-success status.
    #[error("Circle list endpoint returned {status}: {message}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Error message reported by the endpoint, if any
        message: String,
    },
}

impl RegistryError {
    /// Create a `ReadFailed` error for a specific path.
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::ReadFailed {
            path: path.into(),
            source,
        }
    }
}
