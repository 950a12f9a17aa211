//! Caching layer for vetter-runtime.
//!
//! In-memory caching of evidence bundles so repeated evaluations of the
//! same candidate against the same requirement set do not re-query
//! provider APIs within the TTL window.

use moka::future::Cache;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use vetter_core::EvidenceBundle;

/// Cache key for one provider's evidence about one candidate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider_hash: u64,
    candidate_hash: u64,
    requirement_hash: u64,
}

impl CacheKey {
    pub fn new(provider: &str, candidate_id: &str, requirement_id: &str) -> Self {
        Self {
            provider_hash: hash_str(provider),
            candidate_hash: hash_str(candidate_id),
            requirement_hash: hash_str(requirement_id),
        }
    }
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// Evidence cache using moka.
pub struct EvidenceCache {
    cache: Cache<CacheKey, EvidenceBundle>,
}

impl EvidenceCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<EvidenceBundle> {
        self.cache.get(key).await
    }

    /// Store a bundle. Failed fetches are never cached; the next run
    /// should retry them.
    pub async fn insert(&self, key: CacheKey, bundle: EvidenceBundle) {
        if bundle.error.is_none() {
            self.cache.insert(key, bundle).await;
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let cache = EvidenceCache::new(16, Duration::from_secs(60));
        let key = CacheKey::new("awards_db", "c-1", "sol-1");
        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), EvidenceBundle::empty("awards_db")).await;
        let hit = cache.get(&key).await.unwrap();
        assert_eq!(hit.source, "awards_db");
    }

    #[tokio::test]
    async fn test_failed_bundles_not_cached() {
        let cache = EvidenceCache::new(16, Duration::from_secs(60));
        let key = CacheKey::new("awards_db", "c-1", "sol-1");
        cache
            .insert(key.clone(), EvidenceBundle::failed("awards_db", "503"))
            .await;
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_keys_distinguish_all_parts() {
        let base = CacheKey::new("awards_db", "c-1", "sol-1");
        assert_ne!(base, CacheKey::new("patents", "c-1", "sol-1"));
        assert_ne!(base, CacheKey::new("awards_db", "c-2", "sol-1"));
        assert_ne!(base, CacheKey::new("awards_db", "c-1", "sol-2"));
    }
}
