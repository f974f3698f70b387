use thiserror::Error;

/// Errors that can occur when interacting with the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing cache is unreachable.
    ///
    /// Never produced by [`crate::InMemoryCache`]; kept on the seam so
    /// remote-backed implementations surface outages to callers, who treat
    /// them as misses.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A cached value could not be serialized or deserialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
