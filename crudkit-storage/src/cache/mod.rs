//! Hour-bucketed, hash-addressed on-disk cache for read-query results.
//!
//! Layout: `base/YYYY/MM/DD/HH/<hash>.cache`. All entries written within
//! one wall-clock hour share one bucket directory. The first write of a new
//! hour creates its bucket and best-effort deletes the bucket exactly one
//! hour prior, bounding the tree to roughly two hours of entries. Sweeping
//! is a best-effort bound, not a hard guarantee — with no writes for
//! several hours, older buckets linger until a later rollover, and expired
//! entries inside a live bucket are simply treated as misses.
//!
//! Every failure in here degrades: a miss, a `false`, a debug log. Nothing
//! on this path may abort the surrounding query.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Local};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_128;

use crudkit_core::config::CacheConfig;
use crudkit_core::types::statement::ParamBinding;
use crudkit_core::types::value::RowSet;

/// 128-bit content address of one cached result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u128);

impl CacheKey {
    fn file_name(self) -> String {
        format!("{:032x}.cache", self.0)
    }
}

/// The on-disk result cache.
pub struct QueryCache {
    enabled: bool,
    ttl_hours: u64,
    base_dir: PathBuf,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.effective_enabled(),
            ttl_hours: config.effective_ttl_hours(),
            base_dir: config.effective_base_dir(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Derive the content address for a statement: bindings sorted by
    /// column name, serialized, appended to the SQL text, then hashed.
    /// Binding order therefore never affects the key.
    pub fn key_for(sql: &str, bindings: &[ParamBinding]) -> CacheKey {
        let mut sorted: Vec<&ParamBinding> = bindings.iter().collect();
        sorted.sort_by(|a, b| a.column.cmp(&b.column));

        let mut data = sql.as_bytes().to_vec();
        if !sorted.is_empty() {
            if let Ok(serialized) = serde_json::to_vec(&sorted) {
                data.extend_from_slice(&serialized);
            }
        }
        CacheKey(xxh3_128(&data))
    }

    /// Whether a fresh entry exists for this key.
    pub fn has_cache(&self, key: CacheKey) -> bool {
        self.locate(key, Local::now()).is_some()
    }

    /// Read a fresh entry, or miss. Partial or unreadable files (e.g. a
    /// write in progress elsewhere) read as a miss.
    pub fn get_cache(&self, key: CacheKey) -> Option<RowSet> {
        self.get_cache_at(key, Local::now())
    }

    /// Store a result. Returns whether the entry landed on disk.
    pub fn set_cache(&self, key: CacheKey, rows: &RowSet) -> bool {
        self.set_cache_at(key, rows, Local::now())
    }

    /// Delete the whole cache tree. An already-absent tree counts as
    /// cleared.
    pub fn clear_cache(&self) -> bool {
        match fs::remove_dir_all(&self.base_dir) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                debug!("cache clear failed: {e}");
                false
            }
        }
    }

    // ─── clock-explicit internals ───────────────────────────────────────

    fn bucket_dir(&self, at: DateTime<Local>) -> PathBuf {
        self.base_dir
            .join(at.format("%Y").to_string())
            .join(at.format("%m").to_string())
            .join(at.format("%d").to_string())
            .join(at.format("%H").to_string())
    }

    /// Probe hour buckets from `now` back through the TTL window, newest
    /// first, for a fresh entry.
    fn locate(&self, key: CacheKey, now: DateTime<Local>) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        let ttl_secs = (self.ttl_hours * 3600) as i64;
        for hours_back in 0..=self.ttl_hours {
            let path = self
                .bucket_dir(now - Duration::hours(hours_back as i64))
                .join(key.file_name());
            if !path.is_file() {
                continue;
            }
            if entry_age_secs(&path, now).map(|age| age < ttl_secs) == Some(true) {
                return Some(path);
            }
        }
        None
    }

    fn get_cache_at(&self, key: CacheKey, now: DateTime<Local>) -> Option<RowSet> {
        let path = self.locate(key, now)?;
        let bytes = fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(rows) => Some(rows),
            Err(e) => {
                debug!("unreadable cache entry treated as miss: {e}");
                None
            }
        }
    }

    fn set_cache_at(&self, key: CacheKey, rows: &RowSet, now: DateTime<Local>) -> bool {
        if !self.enabled {
            return false;
        }

        let bucket = self.bucket_dir(now);
        if !bucket.is_dir() {
            if let Err(e) = fs::create_dir_all(&bucket) {
                debug!("cache bucket creation failed: {e}");
                return false;
            }
            // New hour: the bucket one hour back becomes garbage.
            self.sweep_previous_bucket(now);
        }

        let payload = match serde_json::to_vec(rows) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("cache payload serialization failed: {e}");
                return false;
            }
        };

        // Exclusive write: land bytes in a process-unique temp file, then
        // rename over the final name so readers never observe a torn entry.
        let tmp = bucket.join(format!("{:032x}.tmp.{}", key.0, std::process::id()));
        if let Err(e) = fs::write(&tmp, &payload) {
            debug!("cache write failed: {e}");
            return false;
        }
        match fs::rename(&tmp, bucket.join(key.file_name())) {
            Ok(()) => true,
            Err(e) => {
                debug!("cache publish failed: {e}");
                let _ = fs::remove_file(&tmp);
                false
            }
        }
    }

    /// Delete the bucket exactly one hour before `now`, swallowing any
    /// failure — concurrent sweepers may race here and that is fine.
    fn sweep_previous_bucket(&self, now: DateTime<Local>) {
        let previous = self.bucket_dir(now - Duration::hours(1));
        if previous.is_dir() {
            if let Err(e) = fs::remove_dir_all(&previous) {
                debug!("cache sweep failed: {e}");
            }
        }
    }
}

fn entry_age_secs(path: &std::path::Path, now: DateTime<Local>) -> Option<i64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let modified_secs = modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()?
        .as_secs() as i64;
    Some(now.timestamp() - modified_secs)
}
