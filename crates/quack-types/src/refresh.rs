//! Load/refresh lifecycle for in-memory store indices.
//!
//! Stores parse their backing file into an index once per load and answer
//! queries from it. A [`Snapshot`] holds the current index and decides,
//! according to its [`RefreshPolicy`], when the file must be parsed again.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// When a store rebuilds its index from disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Rebuild before every query.
    #[default]
    Always,
    /// Rebuild when the file's length or modification time changed.
    IfModified,
    /// Rebuild only on an explicit `reload()`; the first query loads lazily.
    Manual,
}

/// Cheap identity of a file's current contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// Fingerprint `path`, or `Ok(None)` if it does not exist.
    pub fn of(path: &Path) -> io::Result<Option<Self>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(Self {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

struct Loaded<T> {
    fingerprint: Option<FileFingerprint>,
    value: Arc<T>,
}

/// The current in-memory index of a file-backed store.
pub struct Snapshot<T> {
    policy: RefreshPolicy,
    state: RwLock<Option<Loaded<T>>>,
}

impl<T> Snapshot<T> {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Whether an index has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.state.read().expect("lock poisoned").is_some()
    }

    /// Drop the current index; the next [`get`](Self::get) loads again.
    pub fn invalidate(&self) {
        *self.state.write().expect("lock poisoned") = None;
    }

    /// Rebuild the index from `path` unconditionally.
    ///
    /// The fingerprint is taken before `load` runs, so a write racing with
    /// the load is picked up by the next `IfModified` check.
    pub fn reload<E>(
        &self,
        path: &Path,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let fingerprint = FileFingerprint::of(path).ok().flatten();
        let value = Arc::new(load()?);
        *self.state.write().expect("lock poisoned") = Some(Loaded {
            fingerprint,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    /// Return the index, rebuilding it first if the policy requires.
    pub fn get<E>(
        &self,
        path: &Path,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(value) = self.fresh(path) {
            return Ok(value);
        }
        debug!(path = %path.display(), policy = ?self.policy, "rebuilding index");
        self.reload(path, load)
    }

    fn fresh(&self, path: &Path) -> Option<Arc<T>> {
        let state = self.state.read().expect("lock poisoned");
        let loaded = state.as_ref()?;
        match self.policy {
            RefreshPolicy::Always => None,
            RefreshPolicy::Manual => Some(Arc::clone(&loaded.value)),
            RefreshPolicy::IfModified => {
                let current = FileFingerprint::of(path).ok().flatten();
                (current.is_some() && current == loaded.fingerprint)
                    .then(|| Arc::clone(&loaded.value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn counting_load(calls: &Cell<u32>, path: &Path) -> Result<String, Infallible> {
        calls.set(calls.get() + 1);
        Ok(fs::read_to_string(path).unwrap_or_default())
    }

    #[test]
    fn always_reloads_every_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one").unwrap();

        let snap = Snapshot::new(RefreshPolicy::Always);
        let calls = Cell::new(0);
        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn manual_loads_once_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one").unwrap();

        let snap = Snapshot::new(RefreshPolicy::Manual);
        let calls = Cell::new(0);
        assert_eq!(*snap.get(&path, || counting_load(&calls, &path)).unwrap(), "one");

        fs::write(&path, "two").unwrap();
        assert_eq!(*snap.get(&path, || counting_load(&calls, &path)).unwrap(), "one");
        assert_eq!(calls.get(), 1);

        assert_eq!(*snap.reload(&path, || counting_load(&calls, &path)).unwrap(), "two");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn if_modified_tracks_length_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "one").unwrap();

        let snap = Snapshot::new(RefreshPolicy::IfModified);
        let calls = Cell::new(0);
        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        assert_eq!(calls.get(), 1);

        fs::write(&path, "one plus more").unwrap();
        let value = snap.get(&path, || counting_load(&calls, &path)).unwrap();
        assert_eq!(*value, "one plus more");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let snap = Snapshot::new(RefreshPolicy::Manual);
        let calls = Cell::new(0);

        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        assert!(snap.is_loaded());
        snap.invalidate();
        assert!(!snap.is_loaded());
        snap.get(&path, || counting_load(&calls, &path)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn missing_file_fingerprint_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileFingerprint::of(&dir.path().join("nope")).unwrap(), None);
    }
}
