//! Time-to-live read cache.

use dashmap::DashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::sweeper::Sweepable;
use crate::observability::metrics;

/// A cached value with the time it was stored and how long it stays valid.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Valid iff `now - stored_at <= ttl`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) <= self.ttl
    }
}

/// A thread-safe in-memory cache with lazy expiry.
///
/// Cloning yields another handle to the same entries.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    name: &'static str,
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache. `name` labels logs and metrics.
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            entries: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a value; an expired entry is removed and reported as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    /// Look up a value as of `now`.
    pub fn get_at<Q>(&self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_valid_at(now) => {
                metrics::record_cache_lookup(self.name, "hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // Re-check under the write lock; a concurrent set may have refreshed it.
            self.entries.remove_if(key, |_, entry| !entry.is_valid_at(now));
            metrics::record_cache_lookup(self.name, "expired");
            metrics::record_cache_size(self.name, self.entries.len());
        } else {
            metrics::record_cache_lookup(self.name, "miss");
        }
        None
    }

    /// Store with the default TTL.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl_at(key, value, self.default_ttl, Instant::now());
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.set_with_ttl_at(key, value, ttl, Instant::now());
    }

    pub fn set_at(&self, key: K, value: V, now: Instant) {
        self.set_with_ttl_at(key, value, self.default_ttl, now);
    }

    /// Store, replacing any existing entry, as of `now`.
    pub fn set_with_ttl_at(&self, key: K, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );
        metrics::record_cache_size(self.name, self.entries.len());
    }

    /// Remove one entry. Returns true if it was present.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove(key).is_some();
        metrics::record_cache_size(self.name, self.entries.len());
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        metrics::record_cache_size(self.name, 0);
    }

    /// Remove every expired entry; returns how many were dropped.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid_at(now));
        let after = self.entries.len();
        metrics::record_cache_size(self.name, after);
        before.saturating_sub(after)
    }

    /// Number of stored entries, including ones that expired but were not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the key is physically stored, regardless of validity.
    pub fn contains_raw<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }
}

impl<K, V> Sweepable for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn label(&self) -> &'static str {
        self.name
    }

    fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let cache: TtlCache<String, u64> = TtlCache::new("test", Duration::from_secs(60));
        cache.set("metrics:user-1".into(), 42);
        assert_eq!(cache.get("metrics:user-1"), Some(42));
        assert_eq!(cache.get("metrics:user-2"), None);
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let ttl = Duration::from_secs(120);
        let cache: TtlCache<String, &str> = TtlCache::new("test", ttl);
        let stored = Instant::now();
        cache.set_at("property:9".into(), "record", stored);

        // Boundary is inclusive.
        assert_eq!(cache.get_at("property:9", stored + ttl), Some("record"));

        let later = stored + ttl + Duration::from_millis(1);
        assert_eq!(cache.get_at("property:9", later), None);
        assert!(!cache.contains_raw("property:9"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_replaces_and_refreshes() {
        let ttl = Duration::from_secs(10);
        let cache: TtlCache<&str, u32> = TtlCache::new("test", ttl);
        let t0 = Instant::now();
        cache.set_at("balance", 1, t0);
        cache.set_at("balance", 2, t0 + Duration::from_secs(8));

        assert_eq!(cache.get_at("balance", t0 + Duration::from_secs(15)), Some(2));
    }

    #[test]
    fn test_per_entry_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new("test", Duration::from_secs(1800));
        let t0 = Instant::now();
        cache.set_with_ttl_at("volatile", 1, Duration::from_secs(120), t0);
        cache.set_at("stable", 2, t0);

        let later = t0 + Duration::from_secs(600);
        assert_eq!(cache.get_at("volatile", later), None);
        assert_eq!(cache.get_at("stable", later), Some(2));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache: TtlCache<&str, u32> = TtlCache::new("test", Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache: TtlCache<&str, u32> = TtlCache::new("test", Duration::from_secs(60));
        let t0 = Instant::now();
        cache.set_with_ttl_at("short", 1, Duration::from_secs(5), t0);
        cache.set_with_ttl_at("short2", 2, Duration::from_secs(5), t0);
        cache.set_at("long", 3, t0);

        let removed = cache.sweep_at(t0 + Duration::from_secs(30));
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_raw("long"));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache: TtlCache<&str, u32> = TtlCache::new("test", Duration::from_secs(60));
        let handle = cache.clone();
        handle.set("shared", 5);
        assert_eq!(cache.get("shared"), Some(5));
    }
}
