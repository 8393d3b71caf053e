//! Disk-based expiring key/value store.
//!
//! Each namespace is a directory holding one JSON file per key:
//!
//! ```json
//! { "lastUpdate": "2024-03-15 09:30:00", "data": { ... } }
//! ```
//!
//! Timestamps are local wall-clock time. The file's modification time is set
//! to the same instant, and eviction removes the oldest files by modification
//! time once the namespace holds more than `max_entries` files.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{Local, NaiveDateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::CacheError;
use super::key::file_stem;

/// Timestamp format of the `lastUpdate` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default maximum number of entries per namespace.
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// How long a cached entry stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entries never go stale.
    Infinite,
    /// Entries go stale once this much time has passed since they were written.
    Expires(Duration),
}

impl Ttl {
    /// A TTL of the given number of hours.
    ///
    /// A span too long to represent never expires.
    pub fn hours(hours: u64) -> Self {
        Self::checked_hours(hours).unwrap_or(Ttl::Infinite)
    }

    /// A TTL of the given number of hours, or `None` if the span overflows.
    pub fn checked_hours(hours: u64) -> Option<Self> {
        hours
            .checked_mul(60 * 60)
            .map(|secs| Ttl::Expires(Duration::from_secs(secs)))
    }

    /// Whether an entry written at `created` is still fresh at `now`.
    pub fn is_fresh(&self, created: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Ttl::Infinite => true,
            Ttl::Expires(ttl) => {
                let Ok(ttl) = chrono::Duration::from_std(*ttl) else {
                    return true;
                };
                match created.checked_add_signed(ttl) {
                    Some(expiry) => now < expiry,
                    None => true,
                }
            }
        }
    }
}

/// On-disk layout of one entry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile<T> {
    #[serde(rename = "lastUpdate")]
    last_update: String,
    data: T,
}

/// Configuration for one cache namespace.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding all namespaces.
    pub root: PathBuf,
    /// Subdirectory for this namespace.
    pub namespace: String,
    /// Maximum number of entry files kept.
    pub max_entries: usize,
}

impl StoreConfig {
    /// Create a config with the default entry limit.
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Set the maximum number of entries. At least one entry is always kept,
    /// so a value just written can be read back.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// The namespace directory.
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.namespace)
    }
}

/// Expiring store for values of type `T`.
///
/// The store never fetches anything itself. Callers check it with [`get`],
/// fetch on a miss, and hand the result to [`put`].
///
/// [`get`]: ExpiringStore::get
/// [`put`]: ExpiringStore::put
#[derive(Debug, Clone)]
pub struct ExpiringStore<T> {
    dir: PathBuf,
    max_entries: usize,
    _payload: PhantomData<fn() -> T>,
}

impl<T> ExpiringStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store. The directory is created on first write.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            dir: config.dir(),
            max_entries: config.max_entries.max(1),
            _payload: PhantomData,
        }
    }

    /// The namespace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The maximum number of entries kept.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// The file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    /// Look up a fresh entry.
    ///
    /// Returns `None` if the entry is missing, stale, or cannot be read.
    pub fn get(&self, key: &str, ttl: Ttl) -> Option<T> {
        self.get_at(key, ttl, Local::now().naive_local())
    }

    /// Look up a fresh entry as of `now`.
    pub fn get_at(&self, key: &str, ttl: Ttl, now: NaiveDateTime) -> Option<T> {
        let path = self.path_for(key);
        let contents = fs::read_to_string(&path).ok()?;

        let cached: CacheFile<T> = match serde_json::from_str(&contents) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring malformed cache entry");
                return None;
            }
        };

        let created = match NaiveDateTime::parse_from_str(&cached.last_update, TIMESTAMP_FORMAT) {
            Ok(created) => created,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring cache entry with bad timestamp");
                return None;
            }
        };

        if !ttl.is_fresh(created, now) {
            debug!(key, last_update = %cached.last_update, "cache entry is stale");
            return None;
        }

        Some(cached.data)
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, payload: &T) -> Result<(), CacheError> {
        self.put_at(key, payload, Local::now().naive_local())
    }

    /// Store `payload` under `key` with `now` as its write time.
    pub fn put_at(&self, key: &str, payload: &T, now: NaiveDateTime) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let cached = CacheFile {
            last_update: now.format(TIMESTAMP_FORMAT).to_string(),
            data: payload,
        };
        let json =
            serde_json::to_string_pretty(&cached).map_err(|source| CacheError::Serialize {
                key: key.to_string(),
                source,
            })?;

        let path = self.path_for(key);
        fs::write(&path, json).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;
        set_modified(&path, now);

        let evicted = self.evict()?;
        if evicted > 0 {
            debug!(dir = %self.dir.display(), evicted, "evicted old cache entries");
        }
        Ok(())
    }

    /// Number of entry files in the namespace.
    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the namespace holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry in the namespace.
    ///
    /// Best-effort: entries that cannot be deleted are logged and skipped, and
    /// a missing directory is not an error. Returns the number removed.
    pub fn invalidate_all(&self) -> usize {
        let entries = match self.entries() {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "nothing to invalidate");
                return 0;
            }
        };

        let mut removed = 0;
        for (path, _) in entries {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove cache entry"),
            }
        }
        removed
    }

    /// Delete the oldest entries beyond `max_entries`.
    fn evict(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries().map_err(|source| CacheError::Evict {
            path: self.dir.clone(),
            source,
        })?;

        if entries.len() <= self.max_entries {
            return Ok(0);
        }

        // Oldest first; ties broken by name so eviction is deterministic.
        entries.sort_by(|(pa, ta), (pb, tb)| ta.cmp(tb).then_with(|| pa.cmp(pb)));
        let excess = entries.len() - self.max_entries;

        for (path, _) in entries.into_iter().take(excess) {
            fs::remove_file(&path).map_err(|source| CacheError::Evict {
                path: path.clone(),
                source,
            })?;
        }
        Ok(excess)
    }

    /// List entry files with their modification times.
    fn entries(&self) -> std::io::Result<Vec<(PathBuf, SystemTime)>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            out.push((path, modified));
        }
        Ok(out)
    }
}

/// Align the file's modification time with its `lastUpdate` stamp.
fn set_modified(path: &Path, now: NaiveDateTime) {
    let Some(local) = Local.from_local_datetime(&now).earliest() else {
        return;
    };
    let time = SystemTime::from(local);
    let result = fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time));
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "failed to set cache entry mtime");
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fresh_iff_before_expiry(hours in 0u64..200, offset_secs in -100_000i64..100_000) {
            let created = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let expiry = created + chrono::Duration::hours(hours as i64);
            let now = expiry + chrono::Duration::seconds(offset_secs);
            prop_assert_eq!(Ttl::hours(hours).is_fresh(created, now), offset_secs < 0);
            prop_assert!(Ttl::Infinite.is_fresh(created, now));
        }
    }
}
