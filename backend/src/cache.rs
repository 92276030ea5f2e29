//! Response cache for provider calls
//!
//! Key-based TTL cache shared by both provider clients. Expiry is checked on
//! read only: there is no background sweep, no LRU and no size bound. The key
//! space is bounded by user-picked locations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{DateRange, GpsCoordinates};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    created_at: Instant,
}

/// Process-wide TTL cache, constructed once and shared by reference
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if it is younger than the TTL; an expired entry is dropped
    pub async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.created_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Re-check under the write lock: a concurrent set may have refreshed it
        if let Some(entry) = entries.get(key) {
            if entry.created_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            entries.remove(key);
            tracing::debug!(key, "Cache entry expired");
        }
        None
    }

    /// Store or overwrite a value, stamped with the current instant
    pub async fn set(&self, key: impl Into<String>, value: Value) {
        let entry = CacheEntry {
            value,
            created_at: Instant::now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Drop every entry, returning how many were removed
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of stored entries, including expired ones not yet read
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Typed read; an entry that no longer deserializes counts as a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Typed write; values that fail to serialize are not cached
    pub async fn set_json<T: Serialize>(&self, key: impl Into<String>, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json).await,
            Err(e) => tracing::warn!(error = %e, "Skipping cache write for unserializable value"),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Composite key for a provider request
pub fn cache_key(dataset: &str, location: GpsCoordinates, date_range: Option<&DateRange>) -> String {
    let (lon, lat) = location.rounded();
    match date_range {
        Some(range) => format!("{}:{:.4}:{:.4}:{}", dataset, lon, lat, range),
        None => format!("{}:{:.4}:{:.4}:latest", dataset, lon, lat),
    }
}
