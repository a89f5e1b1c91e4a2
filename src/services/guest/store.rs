use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::debug;

use crate::services::cache::{CacheClient, CacheError, MemoryCache, ValkeyClient};
use crate::services::guest::record::GuestRegistrationRecord;

#[derive(Debug, thiserror::Error)]
pub enum GuestStoreError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("guest record serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// TTL-keyed hand-off of partially filled registrations, keyed by coop key.
///
/// No coordination across writers: each coop key belongs to one browser
/// session, so last-writer-wins is fine.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn put(
        &self,
        coop_key: &str,
        record: &GuestRegistrationRecord,
        ttl: Duration,
    ) -> Result<(), GuestStoreError>;

    // `Ok(None)` when the key never existed or has expired.
    async fn get(&self, coop_key: &str) -> Result<Option<GuestRegistrationRecord>, GuestStoreError>;

    async fn remove(&self, coop_key: &str) -> Result<bool, GuestStoreError>;
}

/// `GuestStore` on top of any `CacheClient`, records serialized as JSON.
#[derive(Clone, Debug)]
pub struct CacheGuestStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions with other users of the same cache
    prefix: String,
}

impl CacheGuestStore<ValkeyClient> {
    pub async fn connect(valkey_url: &str) -> Result<Self, GuestStoreError> {
        let client = ValkeyClient::new(valkey_url).await?;
        Ok(Self::new_with_cache(Arc::new(client), "guest"))
    }
}

impl CacheGuestStore<MemoryCache> {
    pub fn in_memory() -> Self {
        Self::new_with_cache(Arc::new(MemoryCache::new()), "guest")
    }
}

impl<C: CacheClient> CacheGuestStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, coop_key: &str) -> String {
        format!("{}:{}", self.prefix, coop_key)
    }
}

#[async_trait]
impl<C: CacheClient> GuestStore for CacheGuestStore<C> {
    async fn put(
        &self,
        coop_key: &str,
        record: &GuestRegistrationRecord,
        ttl: Duration,
    ) -> Result<(), GuestStoreError> {
        let value = serde_json::to_string(record)?;
        self.cache
            .set_with_ttl(&self.key(coop_key), &value, ttl)
            .await?;

        debug!(
            backend = self.cache.backend_name(),
            ttl_seconds = ttl.as_secs(),
            "guest record stored"
        );
        Ok(())
    }

    async fn get(&self, coop_key: &str) -> Result<Option<GuestRegistrationRecord>, GuestStoreError> {
        let Some(raw) = self.cache.get_string(&self.key(coop_key)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn remove(&self, coop_key: &str) -> Result<bool, GuestStoreError> {
        Ok(self.cache.del(&self.key(coop_key)).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> GuestRegistrationRecord {
        GuestRegistrationRecord {
            birthday: Some("1989/01/01".to_string()),
            email_address: Some("guest@example.com".to_string()),
            started_at: Some(
                chrono::DateTime::parse_from_rfc3339("2026-10-19T09:30:00Z")
                    .unwrap()
                    .with_timezone(&chrono::Utc),
            ),
        }
    }

    #[tokio::test]
    async fn record_read_back_before_expiry_is_identical() {
        let store = CacheGuestStore::in_memory();
        let record = snapshot();

        store
            .put("T", &record, Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(store.get("T").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn record_read_after_expiry_is_absent() {
        let store = CacheGuestStore::in_memory();

        store
            .put("T", &snapshot(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("T").await.unwrap(), None);
    }

    #[tokio::test]
    async fn records_are_namespaced_by_prefix() {
        let cache = Arc::new(MemoryCache::new());
        let store = CacheGuestStore::new_with_cache(cache.clone(), "guest");

        store
            .put("abc", &snapshot(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get_string("guest:abc").await.unwrap().is_some());
        assert!(cache.get_string("abc").await.unwrap().is_none());
        assert!(store.remove("abc").await.unwrap());
        assert!(!store.remove("abc").await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_entry_surfaces_as_error() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .set_with_ttl("guest:bad", "not-json", Duration::from_secs(60))
            .await
            .unwrap();
        let store = CacheGuestStore::new_with_cache(cache, "guest");

        assert!(matches!(
            store.get("bad").await,
            Err(GuestStoreError::Serde(_))
        ));
    }
}
