//! The derived profile view.
//!
//! A [`Profile`] is assembled from several independent stores. Each field is
//! its own [`FieldResult`], so one unreadable store leaves the other fields
//! intact and a caller can tell "zero because empty" from "zero because the
//! read failed".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::username::Username;

/// Identifies one field of a [`Profile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    PostCount,
    FollowerCount,
    FollowingCount,
    Bio,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PostCount => "post_count",
            Self::FollowerCount => "follower_count",
            Self::FollowingCount => "following_count",
            Self::Bio => "bio",
        };
        f.write_str(name)
    }
}

/// Why a single profile field could not be computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{field} unavailable: {message}")]
pub struct FieldError {
    pub field: ProfileField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: ProfileField, err: impl fmt::Display) -> Self {
        Self {
            field,
            message: err.to_string(),
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Aggregate profile, computed on demand and never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Username,
    pub post_count: FieldResult<usize>,
    pub follower_count: FieldResult<usize>,
    pub following_count: FieldResult<usize>,
    pub bio: FieldResult<String>,
}

impl Profile {
    /// `true` when every field was computed.
    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }

    /// Errors of every field that failed, in field order.
    pub fn errors(&self) -> Vec<&FieldError> {
        [
            self.post_count.as_ref().err(),
            self.follower_count.as_ref().err(),
            self.following_count.as_ref().err(),
            self.bio.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            username: Username::new("alice").unwrap(),
            post_count: Ok(2),
            follower_count: Ok(1),
            following_count: Ok(0),
            bio: Ok("quack".into()),
        }
    }

    #[test]
    fn complete_profile_has_no_errors() {
        let p = profile();
        assert!(p.is_complete());
        assert!(p.errors().is_empty());
    }

    #[test]
    fn partial_profile_lists_failed_fields() {
        let mut p = profile();
        p.follower_count = Err(FieldError::new(ProfileField::FollowerCount, "disk gone"));
        p.bio = Err(FieldError::new(ProfileField::Bio, "unreadable"));

        assert!(!p.is_complete());
        let fields: Vec<_> = p.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![ProfileField::FollowerCount, ProfileField::Bio]);
        assert_eq!(p.post_count, Ok(2));
        assert_eq!(
            p.errors()[0].to_string(),
            "follower_count unavailable: disk gone"
        );
    }
}
