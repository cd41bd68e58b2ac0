//! Record codecs for the Quackstagram flat files.
//!
//! Three line formats are supported, one record per line:
//!
//! | Codec               | Line                                                                 |
//! |---------------------|----------------------------------------------------------------------|
//! | [`ImageRecordCodec`] | `ImageID: <owner>_<id>, Username: <owner>, Bio: <caption>, Timestamp: <yyyy-MM-dd HH:mm:ss>, Likes: <n>` |
//! | [`FollowLineCodec`]  | `<follower>:<followee1>;<followee2>;...`                            |
//! | [`CredentialCodec`]  | `<username>:<passwordHash>:<bio>`                                   |
//!
//! Decoding fails closed: a malformed line yields a [`CodecError`] naming the
//! offending field. [`decode_lines`] turns those errors into
//! [`ParseWarning`](quack_types::ParseWarning)s so one bad line never spoils
//! a whole file.

pub mod credential;
pub mod error;
pub mod follow;
pub mod image;
pub mod lines;

pub use credential::CredentialCodec;
pub use error::{CodecError, CodecResult};
pub use follow::{FollowLine, FollowLineCodec};
pub use image::ImageRecordCodec;
pub use lines::{decode_lines, Decoded, LineCodec};
