//! Persisted record types.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::username::Username;

/// `chrono` format string for metadata timestamps (`yyyy-MM-dd HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored photo.
///
/// `id` is unique within the owner's namespace; the pair renders as the
/// image key `<owner>_<id>`, which is also the stem of the stored file name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: u64,
    pub owner: Username,
    pub caption: String,
    /// Local wall-clock time of the upload, second precision.
    pub timestamp: NaiveDateTime,
    pub likes: u32,
}

impl ImageRecord {
    /// The image key, `<owner>_<id>`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.owner, self.id)
    }

    /// The stored file name for a given extension.
    ///
    /// An empty extension yields the bare key without a trailing dot.
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.key()
        } else {
            format!("{}.{}", self.key(), extension)
        }
    }
}

/// A directed follow relationship.
///
/// Construction rejects self-edges.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    follower: Username,
    followee: Username,
}

impl FollowEdge {
    pub fn new(follower: Username, followee: Username) -> Result<Self, TypeError> {
        if follower == followee {
            return Err(TypeError::SelfEdge(follower.to_string()));
        }
        Ok(Self { follower, followee })
    }

    pub fn follower(&self) -> &Username {
        &self.follower
    }

    pub fn followee(&self) -> &Username {
        &self.followee
    }
}

impl fmt::Display for FollowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.follower, self.followee)
    }
}

/// One account in the credential store.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub username: Username,
    pub password_hash: String,
    pub bio: String,
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("bio", &self.bio)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(name: &str) -> Username {
        Username::new(name).unwrap()
    }

    fn record(id: u64) -> ImageRecord {
        ImageRecord {
            id,
            owner: user("alice"),
            caption: "hello".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
            likes: 0,
        }
    }

    #[test]
    fn key_and_file_name() {
        let r = record(7);
        assert_eq!(r.key(), "alice_7");
        assert_eq!(r.file_name("png"), "alice_7.png");
        assert_eq!(r.file_name(""), "alice_7");
    }

    #[test]
    fn follow_edge_rejects_self() {
        let err = FollowEdge::new(user("a"), user("a")).unwrap_err();
        assert_eq!(err, TypeError::SelfEdge("a".into()));

        let edge = FollowEdge::new(user("a"), user("b")).unwrap();
        assert_eq!(edge.follower(), "a");
        assert_eq!(edge.followee(), "b");
        assert_eq!(edge.to_string(), "a -> b");
    }

    #[test]
    fn credential_debug_redacts_hash() {
        let entry = CredentialEntry {
            username: user("alice"),
            password_hash: "s3cret-hash".into(),
            bio: "quack".into(),
        };
        let debug = format!("{entry:?}");
        assert!(!debug.contains("s3cret-hash"));
        assert!(debug.contains("<redacted>"));
    }
}
