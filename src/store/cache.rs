/*!
 * Document caching between requests.
 *
 * Documents are stored serialized, so every `get` hands out an independent
 * copy. Writes are last-writer-wins.
 */

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::RwLock;

use crate::app_config::CacheConfig;
use crate::document::Document;
use crate::errors::DraftError;

/// Storage for documents between calls
pub trait DraftCache {
    /// Store `document` under `key`, replacing any previous entry
    fn put(&self, key: &str, document: &Document) -> Result<(), DraftError>;

    /// Fetch the document stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Document>, DraftError>;

    /// Drop the entry under `key`, returning whether it existed
    fn remove(&self, key: &str) -> bool;
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 { self.hits as f64 / total as f64 } else { 0.0 }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    stored_at: DateTime<Utc>,
}

/// Cache keeping serialized documents in memory
#[derive(Debug, Clone)]
pub struct MemoryDraftCache {
    /// Prefix prepended to every key
    prefix: String,

    /// Entries older than this are treated as absent
    ttl: Duration,

    entries: Arc<RwLock<HashMap<String, Entry>>>,

    stats: Arc<RwLock<CacheStats>>,
}

impl MemoryDraftCache {
    pub fn new(prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.prefix.clone(), Duration::hours(config.ttl_hours as i64))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Fetch the document under `key`, or store and return a new empty one
    pub fn get_or_create(&self, key: &str, width: u32, height: u32, fps: u32) -> Result<Document, DraftError> {
        if let Some(document) = self.get(key)? {
            return Ok(document);
        }
        let document = Document::new(width, height, fps);
        self.put(key, &document)?;
        Ok(document)
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.stored_at <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Purged {} expired draft(s)", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        *self.stats.write() = CacheStats::default();
        debug!("Draft cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryDraftCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl DraftCache for MemoryDraftCache {
    fn put(&self, key: &str, document: &Document) -> Result<(), DraftError> {
        let bytes = document.to_bytes()?;
        let full_key = self.full_key(key);
        debug!("Caching draft '{}' ({} bytes)", full_key, bytes.len());
        self.entries.write().insert(
            full_key,
            Entry {
                bytes,
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Document>, DraftError> {
        let full_key = self.full_key(key);
        let bytes = {
            let entries = self.entries.read();
            entries
                .get(&full_key)
                .filter(|entry| Utc::now() - entry.stored_at <= self.ttl)
                .map(|entry| entry.bytes.clone())
        };

        let mut stats = self.stats.write();
        match bytes {
            Some(bytes) => {
                stats.hits += 1;
                debug!("Cache hit for draft '{}'", full_key);
                Ok(Some(Document::from_bytes(&bytes)?))
            }
            None => {
                stats.misses += 1;
                debug!("Cache miss for draft '{}'", full_key);
                Ok(None)
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(&self.full_key(key)).is_some()
    }
}
