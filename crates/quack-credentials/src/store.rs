use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quack_codec::{decode_lines, CredentialCodec};
use quack_types::{CredentialEntry, ParseWarning, QuackConfig, Snapshot, Username};
use tracing::{debug, warn};

use crate::error::{CredentialError, CredentialResult};

/// Credential entries keyed by username.
#[derive(Debug, Default)]
pub struct CredentialIndex {
    entries: HashMap<Username, CredentialEntry>,
    warnings: Vec<ParseWarning>,
}

impl CredentialIndex {
    /// Build the index from the text of a credential file.
    ///
    /// The first line for a username wins; later duplicates are reported
    /// as warnings.
    pub fn parse(text: &str) -> Self {
        let decoded = decode_lines::<CredentialCodec>(text);
        let raw: Vec<&str> = text.lines().collect();
        let mut index = Self {
            warnings: decoded.warnings,
            ..Self::default()
        };
        for (line_number, entry) in decoded.records {
            if index.entries.contains_key(&entry.username) {
                warn!(line_number, user = %entry.username, "duplicate credential entry ignored");
                let text = raw.get(line_number - 1).copied().unwrap_or_default();
                index.warnings.push(ParseWarning::new(
                    line_number,
                    text,
                    format!("duplicate entry for {}", entry.username),
                ));
                continue;
            }
            index.entries.insert(entry.username.clone(), entry);
        }
        index.warnings.sort_by_key(|w| w.line_number);
        index
    }

    pub fn get(&self, user: &Username) -> Option<&CredentialEntry> {
        self.entries.get(user)
    }

    /// `user`'s bio, or an empty string if the user is unknown.
    pub fn bio_of(&self, user: &Username) -> &str {
        self.get(user).map_or("", |e| e.bio.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

/// Read-only store over `data/credentials.txt`.
pub struct CredentialStore {
    path: PathBuf,
    index: Snapshot<CredentialIndex>,
}

impl CredentialStore {
    pub fn new(config: &QuackConfig) -> Self {
        Self::at_path(config.layout().credentials(), config)
    }

    pub fn at_path(path: impl Into<PathBuf>, config: &QuackConfig) -> Self {
        Self {
            path: path.into(),
            index: Snapshot::new(config.refresh),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the credential file now, replacing the in-memory index.
    pub fn load(&self) -> CredentialResult<Arc<CredentialIndex>> {
        self.index.reload(&self.path, || self.read_index())
    }

    /// Same as [`load`](Self::load).
    pub fn reload(&self) -> CredentialResult<Arc<CredentialIndex>> {
        self.load()
    }

    /// The index, refreshed according to the configured policy.
    pub fn index(&self) -> CredentialResult<Arc<CredentialIndex>> {
        self.index.get(&self.path, || self.read_index())
    }

    /// `user`'s bio; empty if the user has no entry.
    pub fn bio_of(&self, user: &Username) -> CredentialResult<String> {
        Ok(self.index()?.bio_of(user).to_string())
    }

    /// `user`'s full entry, if present.
    pub fn entry(&self, user: &Username) -> CredentialResult<Option<CredentialEntry>> {
        Ok(self.index()?.get(user).cloned())
    }

    pub fn contains(&self, user: &Username) -> CredentialResult<bool> {
        Ok(self.index()?.get(user).is_some())
    }

    fn read_index(&self) -> CredentialResult<CredentialIndex> {
        let text = fs::read_to_string(&self.path).map_err(|source| {
            CredentialError::StoreUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;
        let index = CredentialIndex::parse(&text);
        debug!(
            users = index.len(),
            skipped = index.warnings().len(),
            "credentials loaded"
        );
        Ok(index)
    }
}
