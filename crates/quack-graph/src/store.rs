//! The file-backed [`SocialGraphStore`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use quack_codec::{FollowLine, FollowLineCodec, LineCodec};
use quack_types::{DataLayout, ParseWarning, QuackConfig, Snapshot, Username};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::index::GraphIndex;

/// Follow graph backed by `data/following.txt`.
///
/// Reads go through an in-memory [`GraphIndex`] refreshed according to the
/// configured [`RefreshPolicy`](quack_types::RefreshPolicy). Mutations take
/// an exclusive lock on `following.txt.lock`, rewrite the file through a
/// temp file and an atomic rename, and invalidate the index.
pub struct SocialGraphStore {
    path: PathBuf,
    index: Snapshot<GraphIndex>,
    sync_writes: bool,
}

impl SocialGraphStore {
    pub fn new(config: &QuackConfig) -> Self {
        Self::at_path(config.layout().following(), config)
    }

    pub fn at_path(path: impl Into<PathBuf>, config: &QuackConfig) -> Self {
        Self {
            path: path.into(),
            index: Snapshot::new(config.refresh),
            sync_writes: config.sync_writes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the graph file now, replacing the in-memory index.
    pub fn load(&self) -> GraphResult<Arc<GraphIndex>> {
        self.index.reload(&self.path, || self.read_index())
    }

    /// Same as [`load`](Self::load).
    pub fn reload(&self) -> GraphResult<Arc<GraphIndex>> {
        self.load()
    }

    /// The index, refreshed according to the configured policy.
    pub fn index(&self) -> GraphResult<Arc<GraphIndex>> {
        self.index.get(&self.path, || self.read_index())
    }

    pub fn following_count(&self, user: &Username) -> GraphResult<usize> {
        Ok(self.index()?.following_count(user))
    }

    pub fn follower_count(&self, user: &Username) -> GraphResult<usize> {
        Ok(self.index()?.follower_count(user))
    }

    pub fn following_of(&self, user: &Username) -> GraphResult<Vec<Username>> {
        Ok(self.index()?.following_of(user))
    }

    pub fn followers_of(&self, user: &Username) -> GraphResult<Vec<Username>> {
        Ok(self.index()?.followers_of(user))
    }

    /// Warnings from the most recent load.
    pub fn warnings(&self) -> GraphResult<Vec<ParseWarning>> {
        Ok(self.index()?.warnings().to_vec())
    }

    fn read_index(&self) -> GraphResult<GraphIndex> {
        let text = fs::read_to_string(&self.path).map_err(|source| {
            GraphError::StoreUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;
        let index = GraphIndex::parse(&text);
        debug!(
            edges = index.edge_count(),
            skipped = index.warnings().len(),
            "follow graph loaded"
        );
        Ok(index)
    }

    /// Add the edge `follower → followee`.
    ///
    /// Returns `false` if the edge already existed. Creates the graph file
    /// if needed.
    pub fn follow(&self, follower: &Username, followee: &Username) -> GraphResult<bool> {
        if follower == followee {
            return Err(GraphError::SelfFollow(follower.clone()));
        }
        let added = self.rewrite(|lines| {
            let mut target = None;
            for (i, line) in lines.iter().enumerate() {
                let Ok(decoded) = FollowLineCodec::decode(line) else { continue };
                if &decoded.follower != follower {
                    continue;
                }
                if decoded.followees.contains(followee) {
                    return Ok(false);
                }
                target.get_or_insert((i, decoded));
            }
            match target {
                Some((i, mut decoded)) => {
                    decoded.followees.push(followee.clone());
                    lines[i] = FollowLineCodec::encode(&decoded)?;
                }
                None => lines.push(FollowLineCodec::encode(&FollowLine {
                    follower: follower.clone(),
                    followees: vec![followee.clone()],
                })?),
            }
            Ok(true)
        })?;
        if added {
            info!(%follower, %followee, "follow edge added");
        }
        Ok(added)
    }

    /// Remove the edge `follower → followee`.
    ///
    /// Returns `false` if there was no such edge.
    pub fn unfollow(&self, follower: &Username, followee: &Username) -> GraphResult<bool> {
        let removed = self.rewrite(|lines| {
            let mut removed = false;
            for line in lines.iter_mut() {
                let Ok(mut decoded) = FollowLineCodec::decode(line) else { continue };
                if &decoded.follower != follower || !decoded.followees.contains(followee) {
                    continue;
                }
                decoded.followees.retain(|f| f != followee);
                *line = FollowLineCodec::encode(&decoded)?;
                removed = true;
            }
            Ok(removed)
        })?;
        if removed {
            info!(%follower, %followee, "follow edge removed");
        }
        Ok(removed)
    }

    /// Apply `edit` to the file's lines under the graph lock.
    ///
    /// Lines `edit` does not touch, malformed ones included, are written
    /// back verbatim. Nothing is written when `edit` returns `false`.
    fn rewrite(
        &self,
        edit: impl FnOnce(&mut Vec<String>) -> GraphResult<bool>,
    ) -> GraphResult<bool> {
        let write_err = |source: io::Error| GraphError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        let dir = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let lock_path = DataLayout::lock_file(&self.path);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(write_err)?;
        lock.lock_exclusive().map_err(write_err)?;

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(GraphError::StoreUnavailable {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        if !edit(&mut lines)? {
            return Ok(false);
        }

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        for line in &lines {
            writeln!(tmp, "{line}").map_err(write_err)?;
        }
        if self.sync_writes {
            tmp.as_file().sync_all().map_err(write_err)?;
        }
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        self.index.invalidate();
        Ok(true)
    }
}
