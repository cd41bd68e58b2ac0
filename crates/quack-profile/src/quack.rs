//! The [`Quack`] facade.

use std::path::Path;
use std::sync::Arc;

use quack_credentials::CredentialStore;
use quack_graph::SocialGraphStore;
use quack_store::{ImageStore, StoreResult};
use quack_types::{ImageRecord, Profile, QuackConfig, Username};

use crate::service::ProfileQueryService;

type FileProfiles = ProfileQueryService<Arc<ImageStore>, Arc<SocialGraphStore>, Arc<CredentialStore>>;

/// All Quackstagram stores opened over one data root.
pub struct Quack {
    config: QuackConfig,
    images: Arc<ImageStore>,
    graph: Arc<SocialGraphStore>,
    credentials: Arc<CredentialStore>,
    profiles: FileProfiles,
}

impl Quack {
    /// Build every store from `config`. Nothing is read until first use.
    pub fn open(config: QuackConfig) -> Self {
        let images = Arc::new(ImageStore::new(&config));
        let graph = Arc::new(SocialGraphStore::new(&config));
        let credentials = Arc::new(CredentialStore::new(&config));
        let profiles =
            ProfileQueryService::new(images.clone(), graph.clone(), credentials.clone());
        Self {
            config,
            images,
            graph,
            credentials,
            profiles,
        }
    }

    pub fn config(&self) -> &QuackConfig {
        &self.config
    }

    /// Store the image at `source` as `user`'s next post.
    pub fn upload(&self, user: &Username, source: &Path, caption: &str) -> StoreResult<ImageRecord> {
        self.images.store_file(user, source, caption)
    }

    /// `user`'s profile as of now.
    pub fn load_profile(&self, user: &Username) -> Profile {
        self.profiles.load_profile(user)
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn graph(&self) -> &SocialGraphStore {
        &self.graph
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quack_types::ProfileField;
    use std::fs;

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    fn seed_data(root: &Path) {
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("data/following.txt"), "alice:bob;carol\nbob:alice\n").unwrap();
        fs::write(
            root.join("data/credentials.txt"),
            "alice:5f4dcc3b:Pond enthusiast\nbob:e99a18c4:\n",
        )
        .unwrap();
    }

    #[test]
    fn upload_then_profile_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        seed_data(dir.path());
        let source = dir.path().join("duck.png");
        fs::write(&source, b"\x89PNG fake").unwrap();

        let quack = Quack::open(QuackConfig::with_root(dir.path()));
        assert_eq!(quack.load_profile(&alice()).post_count, Ok(0));

        let first = quack.upload(&alice(), &source, "hello").unwrap();
        let p = quack.load_profile(&alice());
        assert_eq!(p.post_count, Ok(1));

        let second = quack.upload(&alice(), &source, "hello again").unwrap();
        let p = quack.load_profile(&alice());
        assert_eq!(p.post_count, Ok(2));
        assert_eq!(p.follower_count, Ok(1));
        assert_eq!(p.following_count, Ok(2));
        assert_eq!(p.bio, Ok("Pond enthusiast".to_string()));

        let uploads = dir.path().join("img/uploaded");
        assert_eq!(first.file_name("png"), "alice_1.png");
        assert_eq!(second.file_name("png"), "alice_2.png");
        assert!(uploads.join("alice_1.png").is_file());
        assert!(uploads.join("alice_2.png").is_file());
    }

    #[test]
    fn missing_graph_file_leaves_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        seed_data(dir.path());
        fs::remove_file(dir.path().join("data/following.txt")).unwrap();

        let quack = Quack::open(QuackConfig::with_root(dir.path()));
        let p = quack.load_profile(&alice());
        assert_eq!(p.post_count, Ok(0));
        assert_eq!(p.bio, Ok("Pond enthusiast".to_string()));
        let failed: Vec<ProfileField> = p.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            failed,
            vec![ProfileField::FollowerCount, ProfileField::FollowingCount]
        );
    }

    #[test]
    fn unknown_user_profile_is_empty_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        seed_data(dir.path());
        let quack = Quack::open(QuackConfig::with_root(dir.path()));
        let p = quack.load_profile(&Username::new("nobody").unwrap());
        assert!(p.is_complete());
        assert_eq!(p.post_count, Ok(0));
        assert_eq!(p.follower_count, Ok(0));
        assert_eq!(p.bio, Ok(String::new()));
    }
}
