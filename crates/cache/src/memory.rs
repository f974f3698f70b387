use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Clock, SystemClock};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Cache, Result};

struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// In-memory cache with per-entry TTLs.
///
/// Expiry is checked lazily on read; expired entries are dropped by the
/// reader that finds them.
#[derive(Clone)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Creates an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache on an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Returns the number of entries, including any not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    metrics::counter!("cache_hits_total").increment(1);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    metrics::counter!("cache_misses_total").increment(1);
                    return Ok(None);
                }
            }
        }

        // Entry found but expired: drop it under the write lock. Re-check
        // expiry since another writer may have refreshed it in between.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                metrics::counter!("cache_hits_total").increment(1);
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        metrics::counter!("cache_misses_total").increment(1);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn invalidate(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
