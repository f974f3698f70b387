use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::{Cache, Result};

/// Cache that stores nothing. Every read is a miss.
///
/// Useful in tests that need deterministic store reads, and as the wiring
/// when caching is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _keys: &[&str]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn every_read_is_a_miss() {
        let cache = NoopCache;
        cache
            .set("k", json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
