use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::{Duration, Instant},
};

use crate::{Did, DidDocument, DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An in-memory document cache with a two-tier time-to-live.
///
/// Entries younger than `stale_ttl` are fresh and served as-is. Entries
/// older than `stale_ttl` but younger than `max_ttl` are stale: still
/// usable, but the caller should refresh them. Entries past `max_ttl` are
/// expired and treated as misses.
///
/// Expired entries are evicted lazily, on the read that observes them.
/// There is no background sweeper.
#[derive(Debug)]
pub struct DidCache {
    entries: RwLock<HashMap<Did, CacheEntry>>,
    stale_ttl: Duration,
    max_ttl: Duration,
}

/// A cached document read, tagged with its freshness tier.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    /// The cached document.
    pub document: DidDocument,

    /// Whether the entry has outlived its stale threshold.
    pub stale: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    document: DidDocument,
    resolved_at: Instant,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DidCache {
    /// Creates a cache with the given freshness and expiry thresholds.
    ///
    /// Fails if `stale_ttl` exceeds `max_ttl`, which would make every stale
    /// entry simultaneously expired.
    pub fn new(stale_ttl: Duration, max_ttl: Duration) -> DidResult<Self> {
        if stale_ttl > max_ttl {
            return Err(DidError::InvalidTtlBounds {
                stale_ms: stale_ttl.as_millis() as u64,
                max_ms: max_ttl.as_millis() as u64,
            });
        }

        Ok(DidCache {
            entries: RwLock::new(HashMap::new()),
            stale_ttl,
            max_ttl,
        })
    }

    /// Stores a freshly resolved document, resetting its age.
    pub fn store(&self, did: Did, document: DidDocument) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        entries.insert(
            did,
            CacheEntry {
                document,
                resolved_at: Instant::now(),
            },
        );
    }

    /// Looks up a document, reporting its freshness tier.
    ///
    /// Returns `None` on a miss or when the entry has expired. An expired
    /// entry is removed as part of the lookup.
    pub fn check(&self, did: &Did) -> Option<CacheHit> {
        // Write lock up front: an expired entry is evicted inline.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = entries.get(did)?;
        let age = entry.resolved_at.elapsed();

        if age > self.max_ttl {
            entries.remove(did);
            return None;
        }

        Some(CacheHit {
            document: entry.document.clone(),
            stale: age > self.stale_ttl,
        })
    }

    /// Removes a cached document, if present.
    pub fn evict(&self, did: &Did) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        entries.remove(did);
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        entries.clear();
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
