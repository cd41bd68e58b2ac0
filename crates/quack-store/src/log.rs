//! The append-only image metadata log (`img/image_details.txt`).

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use quack_codec::{decode_lines, ImageRecordCodec, LineCodec};
use quack_types::{ImageRecord, ParseWarning, Username};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Metadata records indexed by owner.
#[derive(Debug, Default)]
pub struct Catalog {
    by_owner: HashMap<Username, Vec<ImageRecord>>,
    warnings: Vec<ParseWarning>,
}

impl Catalog {
    fn from_text(text: &str) -> Self {
        let decoded = decode_lines::<ImageRecordCodec>(text);
        let mut by_owner: HashMap<Username, Vec<ImageRecord>> = HashMap::new();
        for (_, record) in decoded.records {
            by_owner.entry(record.owner.clone()).or_default().push(record);
        }
        for records in by_owner.values_mut() {
            records.sort_by_key(|r| r.id);
        }
        Self {
            by_owner,
            warnings: decoded.warnings,
        }
    }

    /// Number of records owned by `user`.
    pub fn count_for(&self, user: &Username) -> usize {
        self.by_owner.get(user).map_or(0, Vec::len)
    }

    /// `user`'s records in ascending ID order.
    pub fn records_for(&self, user: &Username) -> &[ImageRecord] {
        self.by_owner.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest ID among `user`'s records, or 0.
    pub fn max_id(&self, user: &Username) -> u64 {
        self.records_for(user).last().map_or(0, |r| r.id)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.by_owner.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Malformed lines skipped while building the catalog.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

/// Reader and appender for the metadata log file.
#[derive(Clone, Debug)]
pub struct MetadataLog {
    path: PathBuf,
    sync_writes: bool,
}

impl MetadataLog {
    pub fn new(path: impl Into<PathBuf>, sync_writes: bool) -> Self {
        Self {
            path: path.into(),
            sync_writes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the whole log. A log that does not exist yet is empty.
    pub fn scan(&self) -> StoreResult<Catalog> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(StoreError::unavailable(&self.path, e)),
        };
        let catalog = Catalog::from_text(&text);
        debug!(
            records = catalog.len(),
            skipped = catalog.warnings().len(),
            "metadata log scanned"
        );
        Ok(catalog)
    }

    /// Append one record as a single line.
    ///
    /// The append holds an exclusive lock on the log. If the write fails
    /// part-way, the file is truncated back to its previous length so no
    /// torn line is left behind.
    pub fn append(&self, record: &ImageRecord) -> StoreResult<()> {
        let mut line = ImageRecordCodec::encode(record)?;
        line.push('\n');
        self.append_line(&line)
            .map_err(|source| StoreError::MetadataWrite {
                path: self.path.clone(),
                source,
            })
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let before = file.metadata()?.len();
        let written = file.write_all(line.as_bytes()).and_then(|()| {
            if self.sync_writes {
                file.sync_data()
            } else {
                Ok(())
            }
        });
        if let Err(e) = written {
            if let Err(trunc) = file.set_len(before) {
                warn!(path = %self.path.display(), error = %trunc, "could not trim torn metadata line");
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(owner: &str, id: u64, caption: &str) -> ImageRecord {
        ImageRecord {
            id,
            owner: Username::new(owner).unwrap(),
            caption: caption.into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 4)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            likes: 0,
        }
    }

    #[test]
    fn missing_log_scans_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("img/image_details.txt"), false);
        let catalog = log.scan().unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.count_for(&Username::new("alice").unwrap()), 0);
    }

    #[test]
    fn append_then_scan() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("img/image_details.txt"), true);
        log.append(&record("alice", 2, "second")).unwrap();
        log.append(&record("bob", 1, "bob's")).unwrap();
        log.append(&record("alice", 1, "first")).unwrap();

        let catalog = log.scan().unwrap();
        let alice = Username::new("alice").unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.count_for(&alice), 2);
        let ids: Vec<u64> = catalog.records_for(&alice).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(catalog.max_id(&alice), 2);
    }

    #[test]
    fn owner_match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("image_details.txt"), false);
        log.append(&record("alice", 1, "x")).unwrap();
        log.append(&record("alice2", 1, "y")).unwrap();

        let catalog = log.scan().unwrap();
        assert_eq!(catalog.count_for(&Username::new("alice").unwrap()), 1);
        assert_eq!(catalog.count_for(&Username::new("ali").unwrap()), 0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_details.txt");
        let log = MetadataLog::new(&path, false);
        log.append(&record("alice", 1, "ok")).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"garbage line\n")
            .unwrap();
        log.append(&record("alice", 2, "ok too")).unwrap();

        let catalog = log.scan().unwrap();
        assert_eq!(catalog.count_for(&Username::new("alice").unwrap()), 2);
        assert_eq!(catalog.warnings().len(), 1);
        assert_eq!(catalog.warnings()[0].line_number, 2);
    }

    #[test]
    fn unreadable_log_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_details.txt");
        fs::create_dir(&path).unwrap();

        let log = MetadataLog::new(&path, false);
        assert!(matches!(log.scan(), Err(StoreError::StorageUnavailable { .. })));
        assert!(matches!(
            log.append(&record("alice", 1, "x")),
            Err(StoreError::MetadataWrite { .. })
        ));
    }
}
