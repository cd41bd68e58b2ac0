//! Error types for follow graph operations.

use std::io;
use std::path::PathBuf;

use quack_codec::CodecError;
use quack_types::Username;
use thiserror::Error;

/// Errors that can occur during follow graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph file is missing or unreadable.
    #[error("follow graph unavailable at {path}: {source}")]
    StoreUnavailable { path: PathBuf, source: io::Error },

    /// Rewriting the graph file failed; the previous file is intact.
    #[error("cannot write follow graph {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// A user cannot follow themselves.
    #[error("{0} cannot follow themselves")]
    SelfFollow(Username),

    /// A graph line could not be encoded.
    #[error("invalid follow line: {0}")]
    Codec(#[from] CodecError),
}

/// Convenience type alias for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;
