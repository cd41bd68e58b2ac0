//! Credential store for the Quackstagram data layer.
//!
//! `data/credentials.txt` holds `username:passwordHash:bio` per line. This
//! crate only reads it: a username's bio (or its full entry) is looked up
//! from an index built once per load. A username that is not present is a
//! valid empty answer, never an error.

pub mod error;
pub mod store;

pub use error::{CredentialError, CredentialResult};
pub use store::{CredentialIndex, CredentialStore};
