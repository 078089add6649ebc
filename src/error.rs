use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the collection pipeline. The pipeline is fail-fast:
/// any of these aborts the run and leaves the roster cache untouched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or HTTP-status failure talking to the remote service.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body did not match the expected XML shape.
    #[error("could not parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: quick_xml::DeError,
    },

    /// A field the pipeline relies on was absent or malformed.
    #[error("{context}: {detail}")]
    Data { context: String, detail: String },

    /// A queued fetch failed. Position is 1-based within its batch.
    #[error("fetch task {position} of {total} failed")]
    Task {
        position: usize,
        total: usize,
        #[source]
        source: Box<FetchError>,
    },

    /// The roster cache file could not be read, parsed or written.
    #[error("roster cache {}: {message}", .path.display())]
    Cache {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<io::Error>,
    },
}

impl FetchError {
    pub fn data(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Data {
            context: context.into(),
            detail: detail.into(),
        }
    }
}
