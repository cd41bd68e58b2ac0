//! Foundation types for the Quackstagram data layer.
//!
//! This crate provides the identity, record, and configuration types shared
//! by every store. Every other quack crate depends on `quack-types`.
//!
//! # Key Types
//!
//! - [`Username`]: Validated account name, safe to embed in file names and record lines
//! - [`ImageRecord`]: One stored photo and its metadata
//! - [`FollowEdge`]: Directed follower → followee relationship
//! - [`CredentialEntry`]: Account credentials and bio
//! - [`Profile`]: Aggregate, per-field fallible profile view
//! - [`QuackConfig`] / [`DataLayout`]: Data root and on-disk layout
//! - [`RefreshPolicy`] / [`Snapshot`]: Load/reload lifecycle for in-memory indices
//! - [`ParseWarning`]: A skipped malformed line

pub mod config;
pub mod error;
pub mod profile;
pub mod record;
pub mod refresh;
pub mod username;
pub mod warning;

pub use config::{DataLayout, QuackConfig};
pub use error::TypeError;
pub use profile::{FieldError, FieldResult, Profile, ProfileField};
pub use record::{CredentialEntry, FollowEdge, ImageRecord, TIMESTAMP_FORMAT};
pub use refresh::{FileFingerprint, RefreshPolicy, Snapshot};
pub use username::Username;
pub use warning::ParseWarning;
