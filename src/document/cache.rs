//! # Prototype Cache
//!
//! Holds at most one live [`DocumentPrototype`] per document type name.
//!
//! The cache stores only [`Weak`] handles. It never keeps a prototype alive
//! on its own: an entry stays live while some [`DocumentRecord`] copied from
//! it (or any other `Arc` holder) exists, and a dead entry behaves exactly
//! like a miss. Callers must not depend on *when* an entry dies.
//!
//! Writes are first-writer-wins. When two producers race on an unseen name,
//! the loser's prototype is dropped and both get the winner back from
//! [`PrototypeCache::put`].
//!
//! [`DocumentRecord`]: super::DocumentRecord

use super::record::DocumentPrototype;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Weak, name-keyed prototype cache.
#[derive(Default)]
pub struct PrototypeCache {
    entries: DashMap<String, Weak<DocumentPrototype>>,
    hits: AtomicU64,
    misses: AtomicU64,
    reclaimed: AtomicU64,
}

impl PrototypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live prototype cached under `name`, if any.
    ///
    /// Never changes what is cached. The only effect is counting the lookup
    /// as a hit or a miss in [`stats`](Self::stats); use
    /// [`contains`](Self::contains) to check without counting.
    pub fn get(&self, name: &str) -> Option<Arc<DocumentPrototype>> {
        let live = self.entries.get(name).and_then(|entry| entry.upgrade());
        match &live {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(document = name, "Prototype cache hit");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(document = name, "Prototype cache miss");
            }
        }
        live
    }

    /// Stores `prototype` unless a live entry already exists for `name`.
    ///
    /// Returns whichever prototype is cached afterwards: `prototype` itself
    /// when it was stored, or the earlier live entry when it was not.
    pub fn put(&self, name: &str, prototype: Arc<DocumentPrototype>) -> Arc<DocumentPrototype> {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get().upgrade();
                match existing {
                    Some(existing) => {
                        debug!(document = name, "Prototype already cached, keeping first");
                        existing
                    }
                    None => {
                        entry.insert(Arc::downgrade(&prototype));
                        self.reclaimed.fetch_add(1, Ordering::Relaxed);
                        debug!(document = name, "Replaced reclaimed prototype");
                        prototype
                    }
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::downgrade(&prototype));
                debug!(document = name, "Prototype cached");
                prototype
            }
        }
    }

    /// Whether a live entry exists for `name`. Does not touch statistics.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    /// Drops entries whose prototype has been reclaimed; returns how many.
    pub fn purge(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.strong_count() > 0;
            if !live {
                removed += 1;
            }
            live
        });
        self.reclaimed.fetch_add(removed as u64, Ordering::Relaxed);
        if removed > 0 {
            debug!(removed, "Purged reclaimed prototypes");
        }
        removed
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            live_entries: self.len(),
        }
    }
}

impl fmt::Debug for PrototypeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Dead entries replaced by `put` or removed by `purge`.
    pub reclaimed: u64,
    pub live_entries: usize,
}

impl CacheStats {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
