//! Read-through cache seam for list endpoints.
//!
//! The cache stores opaque JSON values under well-known keys (see [`keys`])
//! with per-key TTLs. It is an availability optimization, never a source of
//! truth: callers treat every cache failure as a miss and fall through to
//! the stores.

mod error;
pub mod keys;
mod memory;
mod noop;

pub use error::{CacheError, Result};
pub use memory::InMemoryCache;
pub use noop::NoopCache;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Core trait for cache implementations.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the cached value under `key`, or None on a miss or an
    /// expired entry.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Drops the listed keys. Unknown keys are ignored.
    async fn invalidate(&self, keys: &[&str]) -> Result<()>;
}
