//! Cache access helpers shared by the services.
//!
//! The cache is best-effort: every failure here is logged at warn and
//! treated as a miss, so an unavailable cache degrades reads to the stores
//! instead of failing requests.

use std::time::Duration;

use cache::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub(crate) async fn fetch<T, C>(cache: &C, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    C: Cache + ?Sized,
{
    match cache.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "cache read failed, falling through to store");
            None
        }
    }
}

pub(crate) async fn put<T, C>(cache: &C, key: &str, ttl: Duration, value: &T)
where
    T: Serialize,
    C: Cache + ?Sized,
{
    let encoded = match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode value for cache");
            return;
        }
    };
    if let Err(e) = cache.set(key, encoded, ttl).await {
        tracing::warn!(key, error = %e, "cache write failed");
    }
}

pub(crate) async fn invalidate<C>(cache: &C, keys: &[&str])
where
    C: Cache + ?Sized,
{
    if let Err(e) = cache.invalidate(keys).await {
        tracing::warn!(?keys, error = %e, "cache invalidation failed");
    }
}
