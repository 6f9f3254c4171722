//! On-disk store for generated summaries.
//!
//! Entries live in a sled tree under the user's cache directory and are keyed
//! by a SHA-256 digest of the summarizer command and the full prompt, so the
//! same activity summarized with the same instructions is only paid for once.

use crate::ai::Summary;
use crate::config::Config;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sled::Db;
use std::path::Path;
use tracing::debug;

const DB_FILE: &str = "summaries.sled";
const KEY_PREFIX: &str = "summary_";

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    summary: Summary,
    stored_at: DateTime<Utc>,
}

pub struct SummaryCache {
    db: Db,
    ttl: Duration,
}

impl SummaryCache {
    /// Open (creating if needed) the cache in `dir`; entries older than `ttl_hours` are misses
    pub fn open(dir: &Path, ttl_hours: u32) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db = sled::open(dir.join(DB_FILE))?;

        Ok(Self {
            db,
            ttl: Duration::hours(i64::from(ttl_hours)),
        })
    }

    /// Open the cache in the default cache directory with the configured TTL
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&Config::default_cache_dir()?, config.cache_ttl_hours)
    }

    /// Stable key for a summarizer invocation. The NUL separator keeps
    /// `("ab", "c")` and `("a", "bc")` apart.
    pub fn key_for(command: &str, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(command.as_bytes());
        hasher.update([0u8]);
        hasher.update(prompt.as_bytes());
        format!("{}{:x}", KEY_PREFIX, hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Result<Option<Summary>> {
        let Some(bytes) = self.db.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Entry>(&bytes) {
            Ok(entry) if self.is_fresh(&entry, Utc::now()) => Ok(Some(entry.summary)),
            Ok(_) => {
                self.db.remove(key)?;
                Ok(None)
            }
            Err(e) => {
                // Written by an incompatible build; treat as a miss
                debug!(key, error = %e, "Dropping unreadable cache entry");
                self.db.remove(key)?;
                Ok(None)
            }
        }
    }

    pub fn set(&self, key: &str, summary: Summary) -> Result<()> {
        self.put(key, summary, Utc::now())
    }

    fn put(&self, key: &str, summary: Summary, stored_at: DateTime<Utc>) -> Result<()> {
        let bytes = serde_json::to_vec(&Entry { summary, stored_at })?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    fn is_fresh(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.stored_at <= self.ttl
    }

    /// Drop every entry, returning how many there were
    pub fn clear(&self) -> Result<usize> {
        let count = self.db.len();
        self.db.clear()?;
        self.db.flush()?;
        Ok(count)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.db.len(),
            size_bytes: self.db.size_on_disk().unwrap_or(0),
        }
    }

    /// Remove stale and unreadable entries, returning how many went
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut doomed = Vec::new();

        for item in self.db.iter() {
            let (key, bytes) = item?;
            let keep = serde_json::from_slice::<Entry>(&bytes)
                .map(|entry| self.is_fresh(&entry, now))
                .unwrap_or(false);
            if !keep {
                doomed.push(key);
            }
        }

        for key in &doomed {
            self.db.remove(key)?;
        }
        self.db.flush()?;
        Ok(doomed.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub size_bytes: u64,
}

impl CacheStats {
    /// Size on disk as B, KiB or MiB
    pub fn human_size(&self) -> String {
        const KIB: f64 = 1024.0;
        let bytes = self.size_bytes as f64;

        if bytes < KIB {
            format!("{} B", self.size_bytes)
        } else if bytes < KIB * KIB {
            format!("{:.1} KiB", bytes / KIB)
        } else {
            format!("{:.1} MiB", bytes / (KIB * KIB))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::DateRange;
    use tempfile::TempDir;

    fn summary(text: &str) -> Summary {
        Summary::new(
            "alice".to_string(),
            DateRange::parse("2025-01-01", "2025-01-07").unwrap(),
            text.to_string(),
        )
    }

    #[test]
    fn test_key_is_stable_sha256() {
        let key = SummaryCache::key_for("claude", "prompt one");
        // 64 hex chars of SHA-256 after the prefix
        assert_eq!(key.len(), KEY_PREFIX.len() + 64);
        assert_eq!(key, SummaryCache::key_for("claude", "prompt one"));

        assert_ne!(key, SummaryCache::key_for("claude", "prompt two"));
        assert_ne!(key, SummaryCache::key_for("other", "prompt one"));
        assert_ne!(
            SummaryCache::key_for("ab", "c"),
            SummaryCache::key_for("a", "bc")
        );
    }

    #[test]
    fn test_key_for_known_input() {
        // sha256("\0") with empty command and prompt
        assert_eq!(
            SummaryCache::key_for("", ""),
            "summary_6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::open(dir.path(), 24).unwrap();

        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", summary("cached text")).unwrap();

        assert_eq!(cache.get("k").unwrap().unwrap().text, "cached text");
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_stale_entry_is_a_miss_and_removed() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::open(dir.path(), 1).unwrap();

        cache
            .put("old", summary("stale"), Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(cache.get("old").unwrap().is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_unreadable_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::open(dir.path(), 24).unwrap();

        cache.db.insert("junk", b"not json".to_vec()).unwrap();
        assert!(cache.get("junk").unwrap().is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_purge_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = SummaryCache::open(dir.path(), 1).unwrap();

        cache
            .put("old", summary("stale"), Utc::now() - Duration::hours(5))
            .unwrap();
        cache.db.insert("junk", b"{".to_vec()).unwrap();
        cache.set("fresh", summary("new")).unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 2);
        assert!(cache.get("fresh").unwrap().is_some());

        assert_eq!(cache.clear().unwrap(), 1);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_human_size() {
        let stats = |size_bytes| CacheStats {
            entries: 0,
            size_bytes,
        };
        assert_eq!(stats(512).human_size(), "512 B");
        assert_eq!(stats(2048).human_size(), "2.0 KiB");
        assert_eq!(stats(3 * 1024 * 1024).human_size(), "3.0 MiB");
    }
}
