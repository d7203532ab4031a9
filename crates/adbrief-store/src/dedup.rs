use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk shape: `{ "posted_ad_ids": [...], "last_updated": "<RFC 3339>" }`.
#[derive(Debug, Deserialize)]
struct PostedAdsRecord {
    #[serde(default)]
    posted_ad_ids: Vec<String>,
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostedAdsRecordRef<'a> {
    posted_ad_ids: Vec<&'a str>,
    last_updated: DateTime<Utc>,
}

/// Set of ad ids that must never be featured again.
///
/// Grows monotonically: ids are only ever added, through [`DedupStore::commit`].
/// The in-memory set is swapped only after the backing file has been replaced,
/// so a failed commit leaves both the file and this value untouched.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    posted: HashSet<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl DedupStore {
    /// Reads the dedup record at `path`.
    ///
    /// A missing file is not an error; it yields an empty store that will be
    /// created on first commit.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] if the file exists but cannot be read.
    /// - [`StoreError::Parse`] if the contents are not a dedup record.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    posted: HashSet::new(),
                    last_updated: None,
                });
            }
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };

        let record: PostedAdsRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => return Err(StoreError::Parse { path, source: e }),
        };

        let last_updated = record
            .last_updated
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Self {
            path,
            posted: record.posted_ad_ids.into_iter().collect(),
            last_updated,
        })
    }

    /// Like [`DedupStore::open`], but an unreadable or corrupt record degrades
    /// to an empty store. Everything is then treated as new for this run.
    #[must_use]
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "dedup record unreadable; treating every ad as new"
                );
                Self {
                    path,
                    posted: HashSet::new(),
                    last_updated: None,
                }
            }
        }
    }

    #[must_use]
    pub fn contains(&self, ad_id: &str) -> bool {
        self.posted.contains(ad_id)
    }

    #[must_use]
    pub fn posted_ids(&self) -> &HashSet<String> {
        &self.posted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posted.is_empty()
    }

    /// Time of the last successful commit, if the record carries one.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds `ids` to the set and rewrites the backing record atomically.
    ///
    /// Returns the number of ids that were not already present.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Serialize`] if the record cannot be encoded.
    /// - [`StoreError::Io`] if the temp file cannot be written or renamed
    ///   into place. The previous record is left intact.
    pub fn commit<I, S>(&mut self, ids: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged = self.posted.clone();
        let before = merged.len();
        merged.extend(ids.into_iter().map(Into::into));
        let added = merged.len() - before;

        let now = Utc::now();
        let mut sorted: Vec<&str> = merged.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let record = PostedAdsRecordRef {
            posted_ad_ids: sorted,
            last_updated: now,
        };
        let body = serde_json::to_string_pretty(&record)?;

        write_atomic(&self.path, body.as_bytes())?;

        self.posted = merged;
        self.last_updated = Some(now);
        tracing::debug!(
            path = %self.path.display(),
            added,
            total = self.posted.len(),
            "dedup record committed"
        );
        Ok(added)
    }
}

/// Sibling temp file used while replacing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "posted_ads.json".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Writes to a sibling temp file, syncs it, then renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp = temp_path(path);
    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::Io {
            path: tmp,
            source: e,
        });
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}
