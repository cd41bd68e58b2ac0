use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::refresh::RefreshPolicy;
use crate::username::Username;

/// Configuration for a Quackstagram data root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuackConfig {
    /// Directory every store path is resolved against.
    pub root: PathBuf,
    /// When read stores rebuild their in-memory indices.
    pub refresh: RefreshPolicy,
    /// `fsync` image files, metadata appends, counters and graph rewrites.
    pub sync_writes: bool,
}

impl Default for QuackConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            refresh: RefreshPolicy::Always,
            sync_writes: true,
        }
    }
}

impl QuackConfig {
    /// A default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, TypeError> {
        toml::from_str(s).map_err(|e| TypeError::ConfigParse(e.to_string()))
    }

    /// Read and parse a TOML config file.
    ///
    /// A relative `root` is resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, TypeError> {
        let text = fs::read_to_string(path).map_err(|e| TypeError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if config.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.root = dir.join(&config.root);
            }
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, TypeError> {
        toml::to_string(self).map_err(|e| TypeError::ConfigParse(e.to_string()))
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.root)
    }
}

/// On-disk layout under a data root.
///
/// ```text
/// img/uploaded/<username>_<id>.<ext>   image binaries
/// img/image_details.txt                append-only metadata log
/// img/sequences/<username>.seq         per-user ID counters
/// data/following.txt                   follow graph
/// data/credentials.txt                 user accounts
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("img").join("uploaded")
    }

    pub fn image_log(&self) -> PathBuf {
        self.root.join("img").join("image_details.txt")
    }

    pub fn sequences_dir(&self) -> PathBuf {
        self.root.join("img").join("sequences")
    }

    pub fn sequence_file(&self, username: &Username) -> PathBuf {
        self.sequences_dir().join(format!("{username}.seq"))
    }

    pub fn following(&self) -> PathBuf {
        self.root.join("data").join("following.txt")
    }

    pub fn credentials(&self) -> PathBuf {
        self.root.join("data").join("credentials.txt")
    }

    /// Advisory-lock sidecar for a data file (`<file>.lock`).
    pub fn lock_file(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        path.with_file_name(name)
    }
}
