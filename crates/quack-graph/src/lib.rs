//! The Quackstagram follow graph.
//!
//! `data/following.txt` holds one line per follower:
//!
//! ```text
//! alice:bob;carol
//! dave:carol
//! ```
//!
//! Each `follower → followee` pair is one edge. Counts are per distinct
//! edge: above, `following_count(alice) == 2`, `follower_count(carol) == 2`,
//! `follower_count(bob) == 1`.
//!
//! # Modules
//!
//! - [`index`]: [`GraphIndex`], forward and reverse adjacency built once per load
//! - [`store`]: [`SocialGraphStore`], the file-backed store and its edge mutations
//! - [`error`]: [`GraphError`]

pub mod error;
pub mod index;
pub mod store;

pub use error::{GraphError, GraphResult};
pub use index::GraphIndex;
pub use store::SocialGraphStore;
