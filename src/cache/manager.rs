//! URL-keyed response cache with lazy TTL expiry
//!
//! Provides a `ResponseCache` that stores raw response bodies behind a
//! readers-writer lock. Any number of lookups may run together; inserts and
//! clears take the lock exclusively.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A stored response body together with when it was fetched
#[derive(Debug)]
struct CacheEntry {
    /// Raw response bytes
    body: Vec<u8>,
    /// Wall-clock time the body was stored
    cached_at: DateTime<Utc>,
    /// Monotonic timestamp used for the freshness check
    stored_at: Instant,
}

impl CacheEntry {
    fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            cached_at: Utc::now(),
            stored_at: Instant::now(),
        }
    }

    /// An entry is fresh while its age is strictly below the TTL
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Result of a cache hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// The cached response body
    pub body: Vec<u8>,
    /// When the body was originally fetched
    pub cached_at: DateTime<Utc>,
}

/// Thread-safe in-memory cache of upstream responses
///
/// Entries are never mutated in place: a newer fetch replaces the whole
/// entry. Expired entries stay in the map until they are overwritten or the
/// cache is cleared.
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates an empty cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up a fresh entry for `key`
    ///
    /// Returns `None` when nothing is stored or the stored entry is older
    /// than the TTL. Only a shared lock is taken.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if !entry.is_fresh(self.ttl) {
            return None;
        }

        Some(CachedResponse {
            body: entry.body.clone(),
            cached_at: entry.cached_at,
        })
    }

    /// Stores `body` under `key`, replacing any previous entry
    pub async fn insert(&self, key: &str, body: Vec<u8>) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(body));
    }

    /// Discards every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
