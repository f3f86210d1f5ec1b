//! Short-TTL result cache.
//!
//! Shields providers from repeated calls: one entry per metal code, read
//! while younger than the TTL, evicted lazily on the next read after
//! expiry. Entries are replaced wholesale — a reader sees either the
//! prior complete entry or the new complete entry, never a torn value.
//!
//! The backing store sits behind the [`SpotCache`] trait so the engine
//! can be handed a different store (external KV, test double) without
//! touching the pipeline. Cache writes are best-effort: a failed put
//! must never fail the request it belongs to.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use log::debug;

use crate::models::{BlendedQuote, MetalCode};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Get/put contract for blended quote storage, scoped per metal code.
pub trait SpotCache: Send + Sync {
    /// The cached quote for `metal` if one exists and is fresh.
    fn get(&self, metal: MetalCode) -> Option<BlendedQuote>;

    /// Replace the entry for `metal`. Best-effort; never fails the caller.
    fn put(&self, metal: MetalCode, quote: BlendedQuote);
}

struct CacheEntry {
    created_at: Instant,
    quote: BlendedQuote,
}

/// In-process cache over a guarded map.
pub struct InMemorySpotCache {
    ttl: Duration,
    entries: RwLock<HashMap<MetalCode, CacheEntry>>,
}

impl InMemorySpotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySpotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SpotCache for InMemorySpotCache {
    fn get(&self, metal: MetalCode) -> Option<BlendedQuote> {
        let expired = {
            let entries = self.entries.read().ok()?;
            match entries.get(&metal) {
                Some(entry) if entry.created_at.elapsed() <= self.ttl => {
                    return Some(entry.quote.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            // Lazy eviction; re-check age under the write lock in case a
            // fresh entry landed in between.
            if let Ok(mut entries) = self.entries.write() {
                if entries
                    .get(&metal)
                    .is_some_and(|entry| entry.created_at.elapsed() > self.ttl)
                {
                    debug!("evicting expired cache entry for {}", metal);
                    entries.remove(&metal);
                }
            }
        }

        None
    }

    fn put(&self, metal: MetalCode, quote: BlendedQuote) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                metal,
                CacheEntry {
                    created_at: Instant::now(),
                    quote,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(metal: MetalCode) -> BlendedQuote {
        BlendedQuote {
            metal,
            market_price: None,
            retail_price: None,
            main_price: None,
            bias_percent: 0,
            used_count: 0,
            fetched_ok_count: 0,
            updated_at: Utc::now(),
            providers: Vec::new(),
        }
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let cache = InMemorySpotCache::default();
        assert!(cache.get(MetalCode::Xau).is_none());
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = InMemorySpotCache::new(Duration::from_secs(60));
        cache.put(MetalCode::Xau, quote(MetalCode::Xau));

        let hit = cache.get(MetalCode::Xau).unwrap();
        assert_eq!(hit.metal, MetalCode::Xau);
    }

    #[test]
    fn test_entries_are_scoped_per_metal() {
        let cache = InMemorySpotCache::new(Duration::from_secs(60));
        cache.put(MetalCode::Xau, quote(MetalCode::Xau));

        assert!(cache.get(MetalCode::Xag).is_none());
        assert_eq!(cache.get(MetalCode::Xau).unwrap().metal, MetalCode::Xau);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = InMemorySpotCache::new(Duration::ZERO);
        cache.put(MetalCode::Xag, quote(MetalCode::Xag));

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(MetalCode::Xag).is_none());
        // And it stays gone
        assert!(cache.get(MetalCode::Xag).is_none());
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let cache = InMemorySpotCache::new(Duration::from_secs(60));
        cache.put(MetalCode::Xau, quote(MetalCode::Xau));

        let mut replacement = quote(MetalCode::Xau);
        replacement.bias_percent = 75;
        cache.put(MetalCode::Xau, replacement);

        assert_eq!(cache.get(MetalCode::Xau).unwrap().bias_percent, 75);
    }
}
