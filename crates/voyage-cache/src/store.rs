//! The key-value primitives the cache needs from its backing store.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

/// A Redis-compatible key-value store: `GET`, `SET EX`, `DEL`, `SCAN MATCH`
/// and `PING`.
///
/// Implementations are shared across request handlers as
/// `Arc<dyn CacheStore>`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short name for logs and health output.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl` (at least one second).
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Deletes `keys`, returning how many existed.
    async fn del(&self, keys: &[String]) -> CacheResult<u64>;

    /// One `SCAN` step. Returns the next cursor (0 when the scan is complete)
    /// and the keys matching `pattern` in this batch.
    ///
    /// As with Redis, a key that matches for the whole scan is returned even
    /// if other keys are deleted between steps.
    async fn scan_match(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> CacheResult<(u64, Vec<String>)>;

    async fn ping(&self) -> CacheResult<()>;
}

/// Whole seconds for `SET EX`, never zero.
pub(crate) fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
