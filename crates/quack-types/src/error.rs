use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid username {name:?}: {reason}")]
    InvalidUsername { name: String, reason: String },

    #[error("self-edge is not allowed: {0}")]
    SelfEdge(String),

    #[error("cannot read config {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigParse(String),
}
