//! Source traits consumed by [`ProfileQueryService`](crate::ProfileQueryService).

use std::fmt::Display;
use std::sync::Arc;

use quack_credentials::{CredentialError, CredentialStore};
use quack_graph::{GraphError, SocialGraphStore};
use quack_store::{ImageStore, StoreError};
use quack_types::Username;

/// Counts a user's posts.
pub trait PostSource: Send + Sync {
    type Error: Display;

    fn post_count(&self, user: &Username) -> Result<usize, Self::Error>;
}

/// Answers follower and following counts.
pub trait FollowSource: Send + Sync {
    type Error: Display;

    fn follower_count(&self, user: &Username) -> Result<usize, Self::Error>;
    fn following_count(&self, user: &Username) -> Result<usize, Self::Error>;
}

/// Looks up a user's bio. An unknown user has an empty bio.
pub trait BioSource: Send + Sync {
    type Error: Display;

    fn bio_of(&self, user: &Username) -> Result<String, Self::Error>;
}

impl PostSource for ImageStore {
    type Error = StoreError;

    fn post_count(&self, user: &Username) -> Result<usize, StoreError> {
        self.count_for_user(user)
    }
}

impl FollowSource for SocialGraphStore {
    type Error = GraphError;

    fn follower_count(&self, user: &Username) -> Result<usize, GraphError> {
        SocialGraphStore::follower_count(self, user)
    }

    fn following_count(&self, user: &Username) -> Result<usize, GraphError> {
        SocialGraphStore::following_count(self, user)
    }
}

impl BioSource for CredentialStore {
    type Error = CredentialError;

    fn bio_of(&self, user: &Username) -> Result<String, CredentialError> {
        CredentialStore::bio_of(self, user)
    }
}

impl<T: PostSource + ?Sized> PostSource for Arc<T> {
    type Error = T::Error;

    fn post_count(&self, user: &Username) -> Result<usize, Self::Error> {
        (**self).post_count(user)
    }
}

impl<T: FollowSource + ?Sized> FollowSource for Arc<T> {
    type Error = T::Error;

    fn follower_count(&self, user: &Username) -> Result<usize, Self::Error> {
        (**self).follower_count(user)
    }

    fn following_count(&self, user: &Username) -> Result<usize, Self::Error> {
        (**self).following_count(user)
    }
}

impl<T: BioSource + ?Sized> BioSource for Arc<T> {
    type Error = T::Error;

    fn bio_of(&self, user: &Username) -> Result<String, Self::Error> {
        (**self).bio_of(user)
    }
}
