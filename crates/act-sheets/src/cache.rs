//! Process-wide reference snapshot cache using moka
//!
//! One snapshot is shared by every session. It is refetched only after the
//! time-to-live runs out; callers arriving while a refresh is in flight wait
//! for that refresh instead of starting their own. Failed loads are not
//! cached, so the next caller retries.

use crate::error::ConnectionError;
use crate::loader::ReferenceLoader;
use act_model::ReferenceSnapshot;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Default snapshot time-to-live
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Cached snapshot lookup result
pub type SnapshotResult = Result<Arc<ReferenceSnapshot>, Arc<ConnectionError>>;

/// Snapshot cache keyed process-wide
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    inner: Cache<(), Arc<ReferenceSnapshot>>,
    loader: Arc<ReferenceLoader>,
    ttl: Duration,
}

impl ReferenceCache {
    /// Create cache with time-based expiration
    #[must_use]
    pub fn new(loader: ReferenceLoader, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            loader: Arc::new(loader),
            ttl,
        }
    }

    /// Current snapshot, loading it when absent or expired
    pub async fn get(&self) -> SnapshotResult {
        let loader = Arc::clone(&self.loader);
        self.inner
            .try_get_with((), async move {
                tracing::debug!("reference snapshot expired, reloading");
                loader.load().await.map(Arc::new)
            })
            .await
            .map_err(|e| {
                tracing::error!("reference data unavailable: {}", e);
                e
            })
    }

    /// Snapshot if one is cached and fresh, without loading
    pub async fn peek(&self) -> Option<Arc<ReferenceSnapshot>> {
        self.inner.get(&()).await
    }

    /// Drop the cached snapshot so the next `get` reloads
    pub async fn invalidate(&self) {
        self.inner.invalidate(&()).await;
    }

    /// Configured time-to-live
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySpreadsheet;

    fn workbook() -> MemorySpreadsheet {
        MemorySpreadsheet::new().with_sheet(
            "загальні дані",
            vec![vec!["Назва", "Код"], vec!["Пожежна", "FIRE"]],
        )
    }

    fn cache(book: &MemorySpreadsheet, ttl: Duration) -> ReferenceCache {
        ReferenceCache::new(ReferenceLoader::new(Arc::new(book.clone())), ttl)
    }

    #[tokio::test]
    async fn reuses_snapshot_within_ttl() {
        let book = workbook();
        let cache = cache(&book, DEFAULT_TTL);

        let first = cache.get().await.unwrap();
        let calls_after_first = book.calls();
        let second = cache.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(book.calls(), calls_after_first);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let book = workbook();
        let cache = cache(&book, DEFAULT_TTL);

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
        // titles + general data + FIRE lookup miss reads nothing more
        assert_eq!(book.calls(), 2);
    }

    #[tokio::test]
    async fn reloads_after_expiry() {
        let book = workbook();
        let cache = cache(&book, Duration::from_millis(100));

        let first = cache.get().await.unwrap();
        book.set_sheet(
            "загальні дані",
            vec![vec!["Назва", "Код"], vec!["Пожежна", "FIRE"], vec!["Дим", "SMOKE"]],
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = cache.get().await.unwrap();

        assert_eq!(first.system_count(), 1);
        assert_eq!(second.system_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let book = workbook();
        let cache = cache(&book, DEFAULT_TTL);

        cache.get().await.unwrap();
        assert!(cache.peek().await.is_some());
        cache.invalidate().await;
        assert!(cache.peek().await.is_none());

        let calls = book.calls();
        cache.get().await.unwrap();
        assert!(book.calls() > calls);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let book = workbook();
        let cache = cache(&book, DEFAULT_TTL);

        book.set_outage(Some("offline"));
        assert!(cache.get().await.is_err());
        assert!(cache.peek().await.is_none());

        book.set_outage(None);
        assert_eq!(cache.get().await.unwrap().system_count(), 1);
    }
}
