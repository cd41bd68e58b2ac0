//! Image storage for the Quackstagram data layer.
//!
//! An upload is three artifacts: the image file under `img/uploaded/`, one
//! line in the append-only metadata log, and the owner's sequence counter.
//! [`ImageStore::store`] produces all three or none of them.
//!
//! # Design Rules
//!
//! 1. IDs come from a per-user counter file, incremented under an exclusive
//!    advisory lock. Directory listings are never used to pick an ID.
//! 2. The counter advances only after the image file and its metadata line
//!    are both on disk, so a failed upload leaves no gap.
//! 3. Image bytes are staged in a temp file and renamed into place; readers
//!    never see a partially written image.
//! 4. The metadata append is the durability boundary. If it fails, the image
//!    file is removed before the error is returned.
//! 5. An existing image file is never overwritten.

pub mod error;
pub mod log;
pub mod sequence;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use log::{Catalog, MetadataLog};
pub use sequence::{Reservation, SequenceAllocator};
pub use store::ImageStore;
