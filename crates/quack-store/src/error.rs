use std::io;
use std::path::PathBuf;

use quack_codec::CodecError;

/// Errors from image store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The source image could not be read.
    #[error("cannot read source image {path}: {source}")]
    SourceRead { path: PathBuf, source: io::Error },

    /// A target directory or file is inaccessible.
    #[error("storage unavailable at {path}: {source}")]
    StorageUnavailable { path: PathBuf, source: io::Error },

    /// Appending the metadata line failed. Any copied image file has already
    /// been removed when this is returned.
    #[error("metadata append to {path} failed: {source}")]
    MetadataWrite { path: PathBuf, source: io::Error },

    /// The destination image file already exists.
    #[error("image file already exists: {0}")]
    ImageExists(PathBuf),

    /// A sequence counter file holds something other than a number.
    #[error("corrupt sequence counter {path}: {reason}")]
    CorruptSequence { path: PathBuf, reason: String },

    /// The record cannot be represented in the metadata log.
    #[error("invalid image record: {0}")]
    Codec(#[from] CodecError),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
