use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

/// Errors surfaced by index building, refresh, and queries.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A document could not be read by the loader.
    #[error("failed to read document {path}: {source}")]
    Load {
        path: PathBuf,
        source: io::Error,
    },

    #[error("document folder does not exist: {path}")]
    MissingFolder { path: PathBuf },

    #[error("document folder is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Caller asked for a document id outside `0..count`.
    #[error("document id {id} out of range (corpus has {count} documents)")]
    DocumentOutOfRange { id: usize, count: usize },

    #[error("unrecognized ranking method '{method}' (expected vector or probabilistic)")]
    InvalidMethod { method: String },

    /// Highlight or match pattern could not be compiled; aborts only the current query.
    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{name} = {value} is out of range (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("failed to load config {path}: {source}")]
    Config {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
