//! Per-capability value cache with an exclusion set.
//!
//! The cache holds one value list per capability. Capabilities in the
//! exclusion set change state outside negotiation (device online, frames,
//! resolution, ...) and are never stored. Reads and writes always copy, so
//! no caller can reach cached state through an alias.

use std::collections::{BTreeSet, HashMap};

use scancap_core::{CapabilityId, Value};
use tracing::{debug, trace};

use crate::config::EngineConfig;

/// Cached value lists keyed by capability id.
#[derive(Debug, Clone)]
pub struct ValueCache {
    entries: HashMap<CapabilityId, Vec<Value>>,
    exclusions: BTreeSet<CapabilityId>,
    enabled: bool,
}

impl Default for ValueCache {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ValueCache {
    /// Creates an enabled cache with the given exclusion set.
    pub fn new(exclusions: impl IntoIterator<Item = CapabilityId>) -> Self {
        Self {
            entries: HashMap::new(),
            exclusions: exclusions.into_iter().collect(),
            enabled: true,
        }
    }

    /// Creates a cache from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            entries: HashMap::new(),
            exclusions: config.cache_exclusions.clone(),
            enabled: config.cache_enabled,
        }
    }

    /// Returns true if values of `id` may be cached.
    pub fn is_cache_eligible(&self, id: CapabilityId) -> bool {
        self.enabled && !self.exclusions.contains(&id)
    }

    /// Returns a copy of the cached values for `id`.
    pub fn get(&self, id: CapabilityId) -> Option<Vec<Value>> {
        let hit = self.entries.get(&id).cloned();
        trace!(cap = %id, hit = hit.is_some(), "cache lookup");
        hit
    }

    /// Stores a copy of `values` for `id`.
    ///
    /// Returns false (and stores nothing) if `id` is not cache-eligible.
    pub fn put(&mut self, id: CapabilityId, values: &[Value]) -> bool {
        if !self.is_cache_eligible(id) {
            trace!(cap = %id, "not cache-eligible, skipping");
            return false;
        }
        if self.entries.insert(id, values.to_vec()).is_some() {
            debug!(cap = %id, count = values.len(), "updated cache entry");
        } else {
            debug!(cap = %id, count = values.len(), "created cache entry");
        }
        true
    }

    /// Drops the entry for `id`. Returns true if one was present.
    pub fn invalidate(&mut self, id: CapabilityId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            debug!(cap = %id, "invalidated cache entry");
        }
        removed
    }

    /// Drops every entry. The exclusion set is kept.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, "cleared value cache");
    }

    pub fn contains(&self, id: CapabilityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids with a cached entry, in ascending order.
    pub fn ids(&self) -> Vec<CapabilityId> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn exclusions(&self) -> &BTreeSet<CapabilityId> {
        &self.exclusions
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
