//! Read-only access to the edition store.
//!
//! The store is a flat namespace with one entry per edition plus one index
//! entry:
//!
//! ```text
//! data_dir/
//! ├── index.json        # { "latest": "2024-06-01" }
//! ├── 2024-05-31.json   # { "stories": [ ... ] }
//! └── 2024-06-01.json
//! ```
//!
//! [`EditionStore`] is the contract every backend implements;
//! [`DirectoryStore`] is the filesystem backend. Nothing in this module
//! writes to the store.

use crate::models::{DateKey, Edition, EditionIndex};
use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Key of the index entry. Never listed as an edition.
pub const INDEX_KEY: &str = "index";

/// File extension of every entry in a [`DirectoryStore`].
pub const ENTRY_EXTENSION: &str = "json";

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-and-decode access to a store of editions.
///
/// Implementations have no side effects. Decoding is strict: a record that is
/// only partially shaped is a [`StoreError::Parse`], never a defaulted value.
pub trait EditionStore {
    /// Load the singleton index record.
    async fn read_index(&self) -> StoreResult<EditionIndex>;

    /// Enumerate every edition key in the store, excluding the index.
    ///
    /// Order carries no meaning; callers sort.
    async fn list_edition_keys(&self) -> StoreResult<BTreeSet<DateKey>>;

    /// Load and decode a single edition.
    async fn read_edition(&self, key: &DateKey) -> StoreResult<Edition>;
}

/// An [`EditionStore`] backed by a directory of JSON files.
///
/// The root is passed in explicitly; the store never consults the process
/// working directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    async fn read_entry<T: DeserializeOwned>(&self, key: &str) -> StoreResult<T> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                // A directory with an entry's name is not an entry; listing skips it too.
                if e.kind() == io::ErrorKind::NotFound || is_non_file(&path).await {
                    return Err(StoreError::NotFound {
                        key: key.to_string(),
                        path,
                    });
                }
                return Err(StoreError::Io { path, err: e });
            }
        };
        debug!(path = %path.display(), bytes = raw.len(), "Read store entry");
        decode(key, &path, &raw)
    }
}

impl EditionStore for DirectoryStore {
    async fn read_index(&self) -> StoreResult<EditionIndex> {
        let index: EditionIndex = self.read_entry(INDEX_KEY).await?;
        info!(latest = %index.latest, "Loaded edition index");
        Ok(index)
    }

    #[instrument(level = "info", skip_all, fields(root = %self.root.display()))]
    async fn list_edition_keys(&self) -> StoreResult<BTreeSet<DateKey>> {
        let io_err = |err: io::Error| StoreError::Io {
            path: self.root.clone(),
            err,
        };

        let mut entries = fs::read_dir(&self.root).await.map_err(io_err)?;
        let mut keys = BTreeSet::new();

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let file_type = entry.file_type().await.map_err(io_err)?;
            if file_type.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(name = ?file_name, "Skipping non UTF-8 file name");
                continue;
            };
            let Some(stem) = name
                .strip_suffix(ENTRY_EXTENSION)
                .and_then(|s| s.strip_suffix('.'))
            else {
                continue;
            };
            if stem == INDEX_KEY {
                continue;
            }
            match DateKey::parse(stem) {
                Ok(key) => {
                    keys.insert(key);
                }
                Err(e) => warn!(%name, error = %e, "Skipping entry that is not an edition"),
            }
        }

        info!(count = keys.len(), "Listed edition keys");
        Ok(keys)
    }

    async fn read_edition(&self, key: &DateKey) -> StoreResult<Edition> {
        let edition: Edition = self.read_entry(key.as_str()).await?;
        if let Some(stamped) = edition.stamped_date_mismatch(key) {
            warn!(%key, %stamped, "Edition is stamped with another date; the file name wins");
        }
        info!(%key, stories = edition.stories.len(), "Loaded edition");
        Ok(edition)
    }
}

/// Whether something other than a regular file exists at `path`.
async fn is_non_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|meta| !meta.is_file())
}

/// Decode a raw store entry, logging a preview of content that does not fit
/// the expected shape.
fn decode<T: DeserializeOwned>(key: &str, path: &Path, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        warn!(
            %key,
            path = %path.display(),
            error = %e,
            content_preview = %truncate_for_log(raw, 200),
            "Store entry does not decode"
        );
        StoreError::Parse {
            key: key.to_string(),
            path: path.to_owned(),
            err: e,
        }
    })
}

/// The error type for reading the store.
#[derive(Debug)]
pub enum StoreError {
    /// The index or the requested edition does not exist.
    NotFound { key: String, path: PathBuf },

    /// The entry exists but is not valid JSON or does not have the expected
    /// shape.
    Parse {
        key: String,
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Any other I/O failure, including an unreadable store root.
    Io { path: PathBuf, err: io::Error },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, StoreError::Parse { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { key, path } => {
                write!(f, "'{}' not found in store ({})", key, path.display())
            }
            StoreError::Parse { key, path, err } => {
                write!(f, "Parsing '{}' ({}): {}", key, path.display(), err)
            }
            StoreError::Io { path, err } => write!(f, "Reading '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::NotFound { .. } => None,
            StoreError::Parse { err, .. } => Some(err),
            StoreError::Io { err, .. } => Some(err),
        }
    }
}
