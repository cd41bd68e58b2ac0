//! Profile queries and the Quackstagram data-layer facade.
//!
//! [`ProfileQueryService`] fans a profile request out to three sources
//! (posts, follow graph, bios) and merges the answers into a
//! [`Profile`](quack_types::Profile). Each source is behind a small trait so
//! the service can be exercised against failing fakes; the file-backed
//! stores implement them here.
//!
//! [`Quack`] wires the stores to one [`QuackConfig`](quack_types::QuackConfig)
//! and exposes the two entry points a presentation layer needs: `upload`
//! and `load_profile`.

pub mod quack;
pub mod service;
pub mod sources;

pub use quack::Quack;
pub use service::ProfileQueryService;
pub use sources::{BioSource, FollowSource, PostSource};
