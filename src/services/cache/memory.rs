//! Process-local cache with per-entry deadlines.
//!
//! Used for local development (`CACHE_BACKEND=memory`) and tests. Entries are
//! evicted lazily: an expired key is removed the next time it is read.
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::BackendCommand("memory cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::InvalidValue(format!("ttl out of range: {ttl:?}")))?;

        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        Ok(self.lock()?.remove(key).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overwrite_resets_value_and_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v1", Duration::from_millis(20))
            .await
            .unwrap();
        cache
            .set_with_ttl("k", "v2", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get_string("k").await.unwrap(), None);
        assert_eq!(cache.del("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn del_reports_removed_keys() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.del("k").await.unwrap(), 1);
        assert_eq!(cache.get_string("k").await.unwrap(), None);
    }
}
