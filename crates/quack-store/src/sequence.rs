//! Per-user image ID sequences.
//!
//! Each username owns a counter file `<dir>/<username>.seq` holding the last
//! ID handed out, and a lock sidecar `<username>.seq.lock`. Reserving an ID
//! takes an exclusive `flock` on the sidecar, reads the counter, raises it to
//! the caller's floor (the highest ID already on disk), and holds the lock
//! until the [`Reservation`] is committed or dropped. The counter
//! is rewritten through a temp file and an atomic rename, so a crash leaves
//! either the old value or the new one.
//!
//! Because the lock is a kernel advisory lock, allocation is linearizable
//! across threads and across processes sharing the data root.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use quack_types::{DataLayout, Username};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Allocates monotonically increasing, gap-free IDs per username.
#[derive(Clone, Debug)]
pub struct SequenceAllocator {
    dir: PathBuf,
    sync_writes: bool,
}

impl SequenceAllocator {
    pub fn new(dir: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            dir: dir.into(),
            sync_writes,
        }
    }

    fn counter_path(&self, user: &Username) -> PathBuf {
        self.dir.join(format!("{user}.seq"))
    }

    /// The last committed ID for `user`, or `None` if no counter exists yet.
    pub fn current(&self, user: &Username) -> StoreResult<Option<u64>> {
        read_counter(&self.counter_path(user))
    }

    /// Lock `user`'s sequence and reserve the next ID.
    ///
    /// `floor` is called with the lock held and returns the highest ID
    /// already in use. The next ID is above both it and the counter, so a
    /// missing or stale counter never hands out an occupied ID.
    pub fn reserve(
        &self,
        user: &Username,
        floor: impl FnOnce() -> StoreResult<u64>,
    ) -> StoreResult<Reservation> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::unavailable(&self.dir, e))?;

        let path = self.counter_path(user);
        let lock_path = DataLayout::lock_file(&path);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::unavailable(&lock_path, e))?;
        lock.lock_exclusive()
            .map_err(|e| StoreError::unavailable(&lock_path, e))?;

        let counter = read_counter(&path)?;
        let floor = floor()?;
        let last = match counter {
            Some(last) if last >= floor => last,
            Some(last) => {
                debug!(user = %user, counter = last, floor, "sequence counter behind existing IDs");
                floor
            }
            None => {
                debug!(user = %user, seeded = floor, "seeding sequence counter");
                floor
            }
        };

        Ok(Reservation {
            _lock: lock,
            path,
            id: last + 1,
            sync_writes: self.sync_writes,
        })
    }

    /// Reserve and immediately commit the next ID for `user`.
    pub fn allocate(
        &self,
        user: &Username,
        floor: impl FnOnce() -> StoreResult<u64>,
    ) -> StoreResult<u64> {
        self.reserve(user, floor)?.commit()
    }
}

/// An ID reserved under the user's sequence lock.
///
/// Committing persists the counter; dropping without committing releases
/// the lock and leaves the counter untouched, so the ID is handed out again.
#[derive(Debug)]
pub struct Reservation {
    _lock: File,
    path: PathBuf,
    id: u64,
    sync_writes: bool,
}

impl Reservation {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Persist the reserved ID as the user's last committed ID.
    pub fn commit(self) -> StoreResult<u64> {
        write_counter(&self.path, self.id, self.sync_writes)?;
        debug!(path = %self.path.display(), id = self.id, "sequence committed");
        Ok(self.id)
    }
}

fn read_counter(path: &Path) -> StoreResult<Option<u64>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::unavailable(path, e)),
    };
    text.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| StoreError::CorruptSequence {
            path: path.to_path_buf(),
            reason: format!("{:?}: {e}", text.trim()),
        })
}

fn write_counter(path: &Path, value: u64, sync_writes: bool) -> StoreResult<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::unavailable(dir, e))?;
    writeln!(tmp, "{value}").map_err(|e| StoreError::unavailable(tmp.path(), e))?;
    if sync_writes {
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::unavailable(tmp.path(), e))?;
    }
    tmp.persist(path)
        .map_err(|e| StoreError::unavailable(path, e.error))?;
    Ok(())
}
