//! Configuration registry keyed by `(account, region)`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::Settings;
use crate::source::{Defaults, SettingsSource};

/// Composite key identifying one deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsKey {
    pub account: String,
    pub region: String,
}

impl SettingsKey {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// The `<account>-<region>` form used by override files.
    pub fn composite(&self) -> String {
        format!("{}-{}", self.account, self.region)
    }
}

impl std::fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.composite())
    }
}

/// A cache of resolved settings, one shared instance per key.
///
/// Settings are built on the first request for a key and kept for the
/// lifetime of the registry. The registry is passed explicitly to whatever
/// needs it; there is no global instance.
pub struct ConfigurationRegistry {
    source: Box<dyn SettingsSource>,
    instances: Mutex<HashMap<SettingsKey, Arc<Settings>>>,
}

impl ConfigurationRegistry {
    /// Create a registry resolving settings from `source`.
    pub fn new(source: impl SettingsSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Create a registry that hands out the built-in defaults.
    pub fn with_defaults() -> Self {
        Self::new(Defaults)
    }

    /// Resolve the settings for `(account, region)`.
    ///
    /// Repeated calls with the same key return the same instance. The cache
    /// check and the insert happen under one lock, so a key is never
    /// resolved twice.
    pub fn resolve(&self, account: &str, region: &str) -> Arc<Settings> {
        let key = SettingsKey::new(account, region);
        let mut instances = self.instances.lock();
        let settings = instances.entry(key).or_insert_with_key(|key| {
            debug!("Resolving settings for {}", key);
            Arc::new(self.source.settings_for(key))
        });
        Arc::clone(settings)
    }

    /// Check whether settings for the key were already resolved.
    pub fn contains(&self, account: &str, region: &str) -> bool {
        self.instances
            .lock()
            .contains_key(&SettingsKey::new(account, region))
    }

    /// Keys resolved so far.
    pub fn keys(&self) -> Vec<SettingsKey> {
        self.instances.lock().keys().cloned().collect()
    }

    /// Get the number of resolved keys.
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    /// Check if nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

impl Default for ConfigurationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConfigurationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
