//! Profile aggregation.

use quack_types::{FieldError, FieldResult, Profile, ProfileField, Username};
use tracing::{debug, warn};

use crate::sources::{BioSource, FollowSource, PostSource};

/// Assembles [`Profile`]s from independent sources.
///
/// Every sub-query runs regardless of the others' outcome. A failed field
/// carries a [`FieldError`]; the rest of the profile is still returned.
pub struct ProfileQueryService<P, G, B> {
    posts: P,
    graph: G,
    bios: B,
}

impl<P, G, B> ProfileQueryService<P, G, B>
where
    P: PostSource,
    G: FollowSource,
    B: BioSource,
{
    pub fn new(posts: P, graph: G, bios: B) -> Self {
        Self { posts, graph, bios }
    }

    /// Compute `user`'s profile from the current state of each source.
    pub fn load_profile(&self, user: &Username) -> Profile {
        let profile = Profile {
            username: user.clone(),
            post_count: field(ProfileField::PostCount, self.posts.post_count(user)),
            follower_count: field(ProfileField::FollowerCount, self.graph.follower_count(user)),
            following_count: field(
                ProfileField::FollowingCount,
                self.graph.following_count(user),
            ),
            bio: field(ProfileField::Bio, self.bios.bio_of(user)),
        };
        for err in profile.errors() {
            warn!(user = %user, field = %err.field, error = %err.message, "profile field unavailable");
        }
        debug!(user = %user, complete = profile.is_complete(), "profile loaded");
        profile
    }
}

fn field<T, E: std::fmt::Display>(which: ProfileField, result: Result<T, E>) -> FieldResult<T> {
    result.map_err(|e| FieldError::new(which, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Result<usize, &'static str>);

    impl PostSource for Fixed {
        type Error = &'static str;

        fn post_count(&self, _: &Username) -> Result<usize, &'static str> {
            self.0
        }
    }

    struct Graph {
        followers: Result<usize, &'static str>,
        following: Result<usize, &'static str>,
        calls: AtomicUsize,
    }

    impl FollowSource for Graph {
        type Error = &'static str;

        fn follower_count(&self, _: &Username) -> Result<usize, &'static str> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.followers
        }

        fn following_count(&self, _: &Username) -> Result<usize, &'static str> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.following
        }
    }

    struct Bio(Result<&'static str, &'static str>);

    impl BioSource for Bio {
        type Error = &'static str;

        fn bio_of(&self, _: &Username) -> Result<String, &'static str> {
            self.0.map(str::to_string)
        }
    }

    fn graph(followers: Result<usize, &'static str>, following: Result<usize, &'static str>) -> Graph {
        Graph {
            followers,
            following,
            calls: AtomicUsize::new(0),
        }
    }

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[test]
    fn all_fields_present() {
        let service = ProfileQueryService::new(Fixed(Ok(3)), graph(Ok(2), Ok(5)), Bio(Ok("quack")));
        let p = service.load_profile(&alice());
        assert!(p.is_complete());
        assert_eq!(p.username, alice());
        assert_eq!(p.post_count, Ok(3));
        assert_eq!(p.follower_count, Ok(2));
        assert_eq!(p.following_count, Ok(5));
        assert_eq!(p.bio, Ok("quack".to_string()));
    }

    #[test]
    fn failed_posts_do_not_cancel_siblings() {
        let service = ProfileQueryService::new(
            Fixed(Err("disk unplugged")),
            graph(Ok(1), Ok(0)),
            Bio(Ok("")),
        );
        let p = service.load_profile(&alice());
        assert_eq!(
            p.post_count,
            Err(FieldError::new(ProfileField::PostCount, "disk unplugged"))
        );
        assert_eq!(p.follower_count, Ok(1));
        assert_eq!(p.following_count, Ok(0));
        assert_eq!(p.bio, Ok(String::new()));
        assert_eq!(service.graph.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn every_source_failing_still_yields_a_profile() {
        let service = ProfileQueryService::new(
            Fixed(Err("a")),
            graph(Err("b"), Err("c")),
            Bio(Err("d")),
        );
        let p = service.load_profile(&alice());
        let fields: Vec<ProfileField> = p.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                ProfileField::PostCount,
                ProfileField::FollowerCount,
                ProfileField::FollowingCount,
                ProfileField::Bio,
            ]
        );
        assert_eq!(p.errors()[3].message, "d");
    }
}
