use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) <= self.ttl
    }
}

/// Time-bounded memoization keyed by call arguments.
///
/// Whatever the compute function returns is cached, empty results included.
/// The lock is only held while reading or replacing an entry, never across
/// the compute future, so concurrent misses for one key both compute and the
/// last write wins.
#[derive(Debug)]
pub struct ResultCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` if younger than `ttl`, otherwise
    /// run `compute`, store its result and return it.
    pub async fn get_or_compute<F, Fut>(&self, key: K, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key) {
            tracing::debug!("Cache hit");
            return value;
        }

        let value = compute().await;
        self.insert(key, value.clone(), ttl);
        value
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        self.lock().insert(key, entry);
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // entries are replaced whole, so a poisoned map is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn test_computes_once_within_ttl() {
        let cache: ResultCache<String, Option<String>> = ResultCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..2 {
            let value = cache
                .get_or_compute("https://youtube.com/shorts/a".to_string(), TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("transcript".to_string())
                })
                .await;
            assert_eq!(value.as_deref(), Some("transcript"));
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recomputes_after_expiry() {
        let cache: ResultCache<(String, String), Vec<u32>> = ResultCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = ("key".to_string(), "UC1".to_string());

        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        };

        cache.get_or_compute(key.clone(), TTL, compute).await;
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        cache.get_or_compute(key, TTL, compute).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_results_are_cached() {
        let cache: ResultCache<String, Option<String>> = ResultCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let value = cache
                .get_or_compute("url".to_string(), TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    None
                })
                .await;
            assert!(value.is_none());
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_insert_then_get_outside_async_context() {
        let cache: ResultCache<&'static str, u32> = ResultCache::new();
        cache.insert("a", 7, TTL);

        let value = tokio_test::block_on(cache.get_or_compute("a", TTL, || async { 0 }));

        assert_eq!(value, 7);
        assert_eq!(cache.get(&"missing"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache: ResultCache<String, u32> = ResultCache::new();

        let a = cache.get_or_compute("a".to_string(), TTL, || async { 1 }).await;
        let b = cache.get_or_compute("b".to_string(), TTL, || async { 2 }).await;

        assert_eq!((a, b), (1, 2));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache: ResultCache<&'static str, u32> = ResultCache::new();
        cache.insert("short", 1, Duration::from_secs(10));
        cache.insert("long", 2, Duration::from_secs(100));

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get(&"short"), None);
        assert_eq!(cache.get(&"long"), Some(2));
    }
}
