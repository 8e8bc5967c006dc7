//! Response cache for successful upstream payloads.
//!
//! Keys are derived from the endpoint plus a canonical (sorted) rendering of
//! the query parameters, so parameter order never produces a distinct entry.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

/// Failure reported by a cache backend. Callers treat it as a miss.
#[derive(Debug, thiserror::Error)]
#[error("cache backend error: {0}")]
pub struct CacheError(pub String);

/// Key/value store with per-entry TTL.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    fn forget(&self, key: &str) -> Result<(), CacheError>;

    /// Evict every entry whose key starts with `namespace`.
    fn clear(&self, namespace: &str) -> Result<(), CacheError>;
}

/// Build the cache key for `endpoint` called with `params`.
pub fn cache_key(prefix: &str, endpoint: &str, params: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    for (name, value) in params {
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        hasher.update([b'=']);
        hasher.update(value.as_bytes());
    }
    format!("{prefix}{}", hex::encode(hasher.finalize()))
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local cache backed by a concurrent map.
///
/// Expired entries are dropped on read, and swept from the whole map by the
/// first write after the earliest known expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    /// Lower bound on the expiry of every live entry.
    next_expiry: Mutex<Option<Instant>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_expired(&self, now: Instant, next_expiry: &mut Option<Instant>) {
        if next_expiry.map_or(true, |at| at > now) {
            return;
        }

        let mut earliest: Option<Instant> = None;
        self.entries.retain(|_, entry| {
            let live = entry.expires_at > now;
            if live {
                earliest = Some(earliest.map_or(entry.expires_at, |at| at.min(entry.expires_at)));
            }
            live
        });
        *next_expiry = earliest;
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = now + ttl;

        let mut next_expiry = self
            .next_expiry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.sweep_expired(now, &mut next_expiry);
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
        *next_expiry = Some(next_expiry.map_or(expires_at, |at| at.min(expires_at)));
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self, namespace: &str) -> Result<(), CacheError> {
        self.entries.retain(|key, _| !key.starts_with(namespace));
        Ok(())
    }
}
