use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from credential lookups.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file is missing or unreadable.
    #[error("credential store unavailable at {path}: {source}")]
    StoreUnavailable { path: PathBuf, source: io::Error },
}

/// Result alias for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
