//! # Cache Manager
//!
//! JSON values over a [`CacheStore`], keyed by [`CacheKey`].
//!
//! ## Failure Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  try_get / try_set / try_delete / try_delete_pattern                    │
//! │      └── Result<_, CacheError>    caller decides                        │
//! │                                                                         │
//! │  get / set / delete / delete_pattern / invalidate_related               │
//! │      └── warn! and degrade:  None │ no-op │ 0                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pattern Deletion
//! ```text
//! SCAN 0 MATCH p COUNT 100 ──► (c1, [k1..k100]) ──► DEL batch 1 ─┐
//! SCAN c1 ...              ──► (c2, [..])       ──► DEL batch 2 ─┤ in flight
//! SCAN c2 ...              ──► (0,  [..])       ──► DEL batch 3 ─┘ while scanning
//! ```
//!
//! Finished batches are dropped as the scan goes, so memory is bounded by the
//! batches still in flight, not by the number of matching keys.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;
use crate::resource::{CacheResource, TtlTable};
use crate::store::CacheStore;

/// Keys requested per `SCAN` step.
pub const SCAN_BATCH_SIZE: usize = 100;

#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    ttls: TtlTable,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, ttls: TtlTable) -> Self {
        CacheManager { store, ttls }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn ttl(&self, resource: CacheResource) -> Duration {
        self.ttls.ttl(resource)
    }

    // =========================================================================
    // Read
    // =========================================================================

    pub async fn try_get<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheResult<Option<T>> {
        match self.store.get(key.as_str()).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Cached value, or `None` on a miss or any failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.try_get(key).await {
            Ok(hit) => {
                debug!(key = %key, hit = hit.is_some(), "Cache lookup");
                hit
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed, treating as miss");
                None
            }
        }
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Stores `value` with its resource's TTL.
    pub async fn try_set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> CacheResult<()> {
        let ttl = self.ttl(key.resource());
        self.try_set_with_ttl(key, value, ttl).await
    }

    pub async fn try_set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_ex(key.as_str(), &raw, ttl).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        if let Err(e) = self.try_set(key, value).await {
            warn!(key = %key, error = %e, "Cache set failed");
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Removes one key. `true` when it existed.
    pub async fn try_delete(&self, key: &CacheKey) -> CacheResult<bool> {
        let removed = self.store.del(&[key.as_str().to_string()]).await?;
        Ok(removed > 0)
    }

    pub async fn delete(&self, key: &CacheKey) {
        if let Err(e) = self.try_delete(key).await {
            warn!(key = %key, error = %e, "Cache delete failed");
        }
    }

    /// Removes every key matching the glob `pattern`, returning the count.
    ///
    /// Each batch's `DEL` starts as soon as its `SCAN` step returns, so only
    /// batches still in flight are held in memory. The first failed `DEL` is
    /// returned after all of them have finished.
    pub async fn try_delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut pending = FuturesUnordered::new();
        let mut removed = 0;
        let mut first_error = None;
        let mut cursor = 0;

        loop {
            let (next, keys) = self
                .store
                .scan_match(cursor, pattern, SCAN_BATCH_SIZE)
                .await?;
            if !keys.is_empty() {
                let store = Arc::clone(&self.store);
                pending.push(async move { store.del(&keys).await });
            }

            // Start the new DEL and collect the ones already done.
            while let Some(Some(result)) = pending.next().now_or_never() {
                tally(result, &mut removed, &mut first_error);
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        while let Some(result) = pending.next().await {
            tally(result, &mut removed, &mut first_error);
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        debug!(pattern, removed, "Deleted keys by pattern");
        Ok(removed)
    }

    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        match self.try_delete_pattern(pattern).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(pattern, error = %e, "Cache pattern delete failed");
                0
            }
        }
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Purges every pattern registered for `resource`. Stops at the first
    /// failing pattern.
    pub async fn try_invalidate_related(&self, resource: CacheResource) -> CacheResult<u64> {
        let mut removed = 0;
        for pattern in resource.invalidation_patterns() {
            removed += self.try_delete_pattern(pattern).await?;
        }
        Ok(removed)
    }

    /// Purges every pattern registered for `resource`, best-effort per
    /// pattern.
    pub async fn invalidate_related(&self, resource: CacheResource) -> u64 {
        let mut removed = 0;
        for pattern in resource.invalidation_patterns() {
            removed += self.delete_pattern(pattern).await;
        }
        debug!(resource = %resource, removed, "Invalidated related cache entries");
        removed
    }

    /// Whether the store answers `PING`.
    pub async fn is_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

fn tally(result: CacheResult<u64>, removed: &mut u64, first_error: &mut Option<CacheError>) {
    match result {
        Ok(n) => *removed += n,
        Err(e) => {
            warn!(error = %e, "Cache DEL batch failed");
            first_error.get_or_insert(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Trip {
        id: u32,
        title: String,
    }

    fn manager() -> (CacheManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CacheManager::new(store.clone(), TtlTable::new()), store)
    }

    async fn seed(cache: &CacheManager, keys: &[&str]) {
        for key in keys {
            cache
                .store()
                .set_ex(key, "{}", Duration::from_secs(60))
                .await
                .unwrap();
        }
    }

    /// Store that is always down.
    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        fn name(&self) -> &'static str {
            "down"
        }
        async fn get(&self, _: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        async fn set_ex(&self, _: &str, _: &str, _: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        async fn del(&self, _: &[String]) -> CacheResult<u64> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        async fn scan_match(&self, _: u64, _: &str, _: usize) -> CacheResult<(u64, Vec<String>)> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        async fn ping(&self) -> CacheResult<()> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    /// Wraps a `MemoryStore`, recording `SCAN`/`DEL` order and failing the
    /// `DEL` call numbered `fail_del` (0-based).
    struct RecordingStore {
        inner: MemoryStore,
        events: std::sync::Mutex<Vec<&'static str>>,
        fail_del: Option<usize>,
    }

    impl RecordingStore {
        fn new(fail_del: Option<usize>) -> Self {
            RecordingStore {
                inner: MemoryStore::new(),
                events: std::sync::Mutex::new(Vec::new()),
                fail_del,
            }
        }

        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CacheStore for RecordingStore {
        fn name(&self) -> &'static str {
            "recording"
        }
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            self.inner.get(key).await
        }
        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
            self.inner.set_ex(key, value, ttl).await
        }
        async fn del(&self, keys: &[String]) -> CacheResult<u64> {
            let call = {
                let mut events = self.events.lock().unwrap();
                events.push("del");
                events.iter().filter(|e| **e == "del").count() - 1
            };
            if self.fail_del == Some(call) {
                return Err(CacheError::Command("DEL failed".to_string()));
            }
            self.inner.del(keys).await
        }
        async fn scan_match(
            &self,
            cursor: u64,
            pattern: &str,
            count: usize,
        ) -> CacheResult<(u64, Vec<String>)> {
            self.events.lock().unwrap().push("scan");
            self.inner.scan_match(cursor, pattern, count).await
        }
        async fn ping(&self) -> CacheResult<()> {
            Ok(())
        }
    }

    async fn seed_trips(store: &dyn CacheStore, count: usize) {
        for i in 0..count {
            store
                .set_ex(&format!("trips:id:{:03}", i), "{}", Duration::from_secs(60))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, _) = manager();
        let key = CacheKey::new(CacheResource::Trips, [("id", "7")]);
        let trip = Trip {
            id: 7,
            title: "Bali Surf Week".to_string(),
        };

        cache.set(&key, &trip).await;
        assert_eq!(cache.get::<Trip>(&key).await, Some(trip));

        let other = CacheKey::new(CacheResource::Trips, [("id", "8")]);
        assert_eq!(cache.get::<Trip>(&other).await, None);
    }

    #[tokio::test]
    async fn test_malformed_value_is_a_miss() {
        let (cache, _) = manager();
        let key = CacheKey::bare(CacheResource::Trips);
        cache
            .store()
            .set_ex(key.as_str(), "not json", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(matches!(
            cache.try_get::<Trip>(&key).await,
            Err(CacheError::Serialization(_))
        ));
        assert_eq!(cache.get::<Trip>(&key).await, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let (cache, _) = manager();
        let key = CacheKey::bare(CacheResource::Promos);
        cache.set(&key, &vec![1, 2, 3]).await;

        assert!(cache.try_delete(&key).await.unwrap());
        assert!(!cache.try_delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_pattern_spans_scan_batches() {
        let (cache, store) = manager();
        for i in 0..250 {
            cache
                .set(&CacheKey::new(CacheResource::Trips, [("id", i)]), &i)
                .await;
        }
        cache.set(&CacheKey::bare(CacheResource::Users), &0).await;

        assert_eq!(cache.delete_pattern("trips:*").await, 250);
        assert_eq!(store.len().await, 1);
        assert_eq!(cache.delete_pattern("trips:*").await, 0);
    }

    #[tokio::test]
    async fn test_delete_pattern_deletes_while_scanning() {
        let store = Arc::new(RecordingStore::new(None));
        seed_trips(store.as_ref(), 250).await;
        let cache = CacheManager::new(store.clone(), TtlTable::new());

        assert_eq!(cache.try_delete_pattern("trips:*").await.unwrap(), 250);
        // batch 1 is deleted before the second SCAN step
        assert_eq!(store.events(), vec!["scan", "del", "scan", "del", "scan", "del"]);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_pattern_finishes_other_batches_on_error() {
        let store = Arc::new(RecordingStore::new(Some(1)));
        seed_trips(store.as_ref(), 250).await;
        let cache = CacheManager::new(store.clone(), TtlTable::new());

        assert!(matches!(
            cache.try_delete_pattern("trips:*").await,
            Err(CacheError::Command(_))
        ));
        // batches 1 and 3 went through; the failed one is left
        assert_eq!(store.inner.len().await, SCAN_BATCH_SIZE);
    }

    #[tokio::test]
    async fn test_invalidate_bookings() {
        let (cache, store) = manager();
        seed(
            &cache,
            &[
                "bookings",
                "bookings:status:confirmed",
                "users:42:bookings",
                "analytics:bookings:daily",
                "users:42",
                "trips:id:1",
            ],
        )
        .await;

        let removed = cache.invalidate_related(CacheResource::Bookings).await;
        assert_eq!(removed, 4);

        assert_eq!(store.len().await, 2);
        assert!(store.get("users:42").await.unwrap().is_some());
        assert!(store.get("trips:id:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_vendors_purges_trips() {
        let (cache, store) = manager();
        seed(&cache, &["vendors:id:v1", "trips:id:1", "promos"]).await;

        assert_eq!(cache.try_invalidate_related(CacheResource::Vendors).await.unwrap(), 2);
        assert!(store.get("promos").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ttl_comes_from_resource() {
        let store = Arc::new(MemoryStore::with_exact_ttl());
        let ttls = TtlTable::new().with_override(CacheResource::Analytics, Duration::from_millis(20));
        let cache = CacheManager::new(store, ttls);

        let short = CacheKey::bare(CacheResource::Analytics);
        let long = CacheKey::bare(CacheResource::Trips);
        cache.set(&short, &1).await;
        cache.set(&long, &2).await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get::<i32>(&short).await, None);
        assert_eq!(cache.get::<i32>(&long).await, Some(2));
        assert_eq!(cache.ttl(CacheResource::Trips), Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades() {
        let cache = CacheManager::new(Arc::new(DownStore), TtlTable::new());
        let key = CacheKey::bare(CacheResource::Trips);

        assert_eq!(cache.get::<Trip>(&key).await, None);
        cache.set(&key, &1).await;
        cache.delete(&key).await;
        assert_eq!(cache.delete_pattern("trips:*").await, 0);
        assert_eq!(cache.invalidate_related(CacheResource::Trips).await, 0);
        assert!(!cache.is_healthy().await);

        assert!(matches!(
            cache.try_get::<Trip>(&key).await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(cache.try_invalidate_related(CacheResource::Trips).await.is_err());
    }
}
