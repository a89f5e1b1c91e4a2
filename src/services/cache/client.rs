//! Cache client interface used by higher-level services (guest registration hand-off).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - Kept independent from `AppError` so callers decide how to fail.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal, string-based cache interface.
///
/// The guest hand-off only needs `SET .. EX`, `GET` and `DEL`.
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value. Expired keys read as `None`.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set (or overwrite) a value with TTL. Last writer wins.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
