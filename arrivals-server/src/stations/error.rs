//! Station catalog error types.

use std::path::PathBuf;

/// Errors that can occur when loading the station topology.
///
/// All of these are fatal: the service has nothing to index arrivals against
/// without a topology.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The topology file could not be read
    #[error("couldn't read stations file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The topology file is not valid JSON of the expected shape
    #[error("malformed stations file: {0}")]
    Json(#[from] serde_json::Error),

    /// The topology contains no stations
    #[error("stations file contains no stations")]
    Empty,
}
