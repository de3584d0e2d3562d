//! Engine configuration.

use std::collections::BTreeSet;
use std::path::Path;

use scancap_core::CapabilityId;
use scancap_core::names::{
    CAP_DEVICEONLINE, CAP_DUPLEXENABLED, CAP_ENABLEDSUIDSONLY, ICAP_BITDEPTH, ICAP_FRAMES,
    ICAP_XRESOLUTION, ICAP_YRESOLUTION,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Default number of records kept in the error history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Capabilities whose values change outside negotiation and are always
/// queried live.
pub const DEFAULT_CACHE_EXCLUSIONS: [CapabilityId; 7] = [
    CAP_DEVICEONLINE,
    CAP_DUPLEXENABLED,
    CAP_ENABLEDSUIDSONLY,
    ICAP_BITDEPTH,
    ICAP_FRAMES,
    ICAP_XRESOLUTION,
    ICAP_YRESOLUTION,
];

/// Negotiation engine configuration.
///
/// Every field is optional in the TOML form:
///
/// ```toml
/// history_capacity = 20
/// cache_enabled = true
/// cache_exclusions = ["ICAP_XRESOLUTION", 0x8001]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of records kept in the error history.
    pub history_capacity: usize,

    /// Capabilities that are never cached.
    pub cache_exclusions: BTreeSet<CapabilityId>,

    /// When false, every GET goes to the device.
    pub cache_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            cache_exclusions: DEFAULT_CACHE_EXCLUSIONS.into_iter().collect(),
            cache_enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading engine config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builder: set history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Builder: replace the cache exclusion set.
    pub fn with_cache_exclusions(mut self, ids: impl IntoIterator<Item = CapabilityId>) -> Self {
        self.cache_exclusions = ids.into_iter().collect();
        self
    }

    /// Builder: add one id to the cache exclusion set.
    pub fn with_cache_exclusion(mut self, id: CapabilityId) -> Self {
        self.cache_exclusions.insert(id);
        self
    }

    /// Builder: enable or disable value caching.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}
