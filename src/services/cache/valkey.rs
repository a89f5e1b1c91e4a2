use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey/Redis-backed cache client.
///
/// Shared by every request; `ConnectionManager` reconnects on its own.
#[derive(Clone)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for ValkeyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValkeyClient").finish_non_exhaustive()
    }
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();

        let resp: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(resp)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // `SET key value EX <seconds>` overwrites and resets the expiry in one round-trip.
        let mut conn = self.manager.clone();

        // EX expects integer seconds. We clamp to at least 1 sec.
        let ttl_seconds: u64 = ttl.as_secs().max(1);

        let resp: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        match resp.as_deref() {
            Some("OK") => Ok(()),
            other => Err(CacheError::BackendCommand(format!(
                "unexpected SET reply: {other:?}"
            ))),
        }
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.manager.clone();

        let n: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(n)
    }
}
