use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime, Timelike};
use quack_codec::{ImageRecordCodec, LineCodec};
use quack_types::{DataLayout, ImageRecord, QuackConfig, Snapshot, Username};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::log::{Catalog, MetadataLog};
use crate::sequence::SequenceAllocator;

/// Stores uploaded images and their metadata.
///
/// Concurrent `store` calls for the same user are serialized by the user's
/// sequence lock; calls for different users only contend on the metadata
/// log append.
pub struct ImageStore {
    uploads_dir: PathBuf,
    log: MetadataLog,
    sequences: SequenceAllocator,
    catalog: Snapshot<Catalog>,
    sync_writes: bool,
}

impl ImageStore {
    pub fn new(config: &QuackConfig) -> Self {
        Self::with_layout(&config.layout(), config)
    }

    pub fn with_layout(layout: &DataLayout, config: &QuackConfig) -> Self {
        Self {
            uploads_dir: layout.uploads_dir(),
            log: MetadataLog::new(layout.image_log(), config.sync_writes),
            sequences: SequenceAllocator::new(layout.sequences_dir(), config.sync_writes),
            catalog: Snapshot::new(config.refresh),
            sync_writes: config.sync_writes,
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Hand out the next ID for `user` without storing anything.
    pub fn allocate_id(&self, user: &Username) -> StoreResult<u64> {
        self.sequences.allocate(user, || self.highest_existing_id(user))
    }

    /// Store the image at `source` for `user`.
    ///
    /// The extension is taken from the text after the last `.` of the file
    /// name; a name without a dot is stored without an extension.
    pub fn store_file(
        &self,
        user: &Username,
        source: &Path,
        caption: &str,
    ) -> StoreResult<ImageRecord> {
        let bytes = fs::read(source).map_err(|e| StoreError::SourceRead {
            path: source.to_path_buf(),
            source: e,
        })?;
        let extension = source
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit_once('.'))
            .map_or("", |(_, ext)| ext);
        self.store(user, &bytes, extension, caption)
    }

    /// Store `bytes` as a new image of `user`.
    ///
    /// Order of effects: reserve the ID, stage the bytes in a temp file,
    /// rename it to `<user>_<id>.<ext>`, append the metadata line, commit
    /// the counter. A failure at any step undoes the earlier ones.
    pub fn store(
        &self,
        user: &Username,
        bytes: &[u8],
        extension: &str,
        caption: &str,
    ) -> StoreResult<ImageRecord> {
        let extension = sanitize_extension(extension)?;
        fs::create_dir_all(&self.uploads_dir)
            .map_err(|e| StoreError::unavailable(&self.uploads_dir, e))?;

        let reservation = self
            .sequences
            .reserve(user, || self.highest_existing_id(user))?;
        let record = ImageRecord {
            id: reservation.id(),
            owner: user.clone(),
            caption: caption.to_string(),
            timestamp: now(),
            likes: 0,
        };
        // Reject unencodable captions before any file is written.
        ImageRecordCodec::encode(&record)?;

        let dest = self.uploads_dir.join(record.file_name(extension));
        self.write_image(&dest, bytes)?;

        if let Err(e) = self.log.append(&record) {
            self.remove_orphan(&dest);
            return Err(e);
        }
        self.catalog.invalidate();

        if let Err(e) = reservation.commit() {
            // The image and its metadata are durable; the next reservation
            // lifts the stale counter past them.
            warn!(user = %user, id = record.id, error = %e, "sequence counter not advanced");
        }

        info!(user = %user, id = record.id, path = %dest.display(), "image stored");
        Ok(record)
    }

    /// Number of metadata records owned by `user`.
    pub fn count_for_user(&self, user: &Username) -> StoreResult<usize> {
        Ok(self.catalog()?.count_for(user))
    }

    /// `user`'s records in ascending ID order.
    pub fn records_for_user(&self, user: &Username) -> StoreResult<Vec<ImageRecord>> {
        Ok(self.catalog()?.records_for(user).to_vec())
    }

    /// Locate the stored file of `record`, whatever its extension.
    pub fn image_path(&self, record: &ImageRecord) -> StoreResult<Option<PathBuf>> {
        let key = record.key();
        let entries = match fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::unavailable(&self.uploads_dir, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::unavailable(&self.uploads_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&key) else { continue };
            if rest.is_empty() || rest.starts_with('.') {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }

    /// Parse the metadata log now, replacing the in-memory catalog.
    pub fn load(&self) -> StoreResult<Arc<Catalog>> {
        self.catalog.reload(self.log.path(), || self.log.scan())
    }

    /// Same as [`load`](Self::load).
    pub fn reload(&self) -> StoreResult<Arc<Catalog>> {
        self.load()
    }

    /// The catalog, refreshed according to the configured policy.
    pub fn catalog(&self) -> StoreResult<Arc<Catalog>> {
        self.catalog.get(self.log.path(), || self.log.scan())
    }

    fn write_image(&self, dest: &Path, bytes: &[u8]) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.uploads_dir)
            .map_err(|e| StoreError::unavailable(&self.uploads_dir, e))?;
        tmp.write_all(bytes)
            .map_err(|e| StoreError::unavailable(tmp.path(), e))?;
        if self.sync_writes {
            tmp.as_file()
                .sync_all()
                .map_err(|e| StoreError::unavailable(tmp.path(), e))?;
        }
        tmp.persist_noclobber(dest).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StoreError::ImageExists(dest.to_path_buf())
            } else {
                StoreError::unavailable(dest, e.error)
            }
        })?;
        debug!(path = %dest.display(), len = bytes.len(), "image file written");
        Ok(())
    }

    fn remove_orphan(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => warn!(path = %path.display(), "metadata append failed; removed image file"),
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "metadata append failed and image file could not be removed"
            ),
        }
    }

    /// Highest ID `user` already occupies, in the log or in the upload
    /// directory. Every reservation starts above it, so neither earlier
    /// uploads nor leftover files are ever overwritten.
    fn highest_existing_id(&self, user: &Username) -> StoreResult<u64> {
        let from_log = self.log.scan()?.max_id(user);
        let prefix = format!("{user}_");
        let mut from_files = 0;
        match fs::read_dir(&self.uploads_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let name = entry.file_name();
                    let Some(name) = name.to_str() else { continue };
                    let Some(rest) = name.strip_prefix(&prefix) else { continue };
                    let stem = rest.split_once('.').map_or(rest, |(stem, _)| stem);
                    if let Ok(id) = stem.parse::<u64>() {
                        from_files = from_files.max(id);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::unavailable(&self.uploads_dir, e)),
        }
        Ok(from_log.max(from_files))
    }
}

/// Extensions end up in file names; only plain alphanumerics are kept.
fn sanitize_extension(extension: &str) -> StoreResult<&str> {
    let extension = extension.trim_start_matches('.');
    if let Some(ch) = extension.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(StoreError::Codec(quack_codec::CodecError::ForbiddenCharacter {
            field: "extension",
            ch,
        }));
    }
    Ok(extension)
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
