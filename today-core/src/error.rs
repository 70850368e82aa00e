//! Error types for today-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::FetchError;
use crate::ics::ParseError;

/// Errors that can occur in today operations.
#[derive(Error, Debug)]
pub enum TodayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cache index is corrupt: {0}")]
    CacheIndex(String),

    #[error("No feeds configured")]
    NoFeeds,
}

impl TodayError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TodayError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for today operations.
pub type TodayResult<T> = Result<T, TodayError>;
