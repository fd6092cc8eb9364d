//! Settings sources: built-in defaults and layered YAML overrides.
//!
//! An override file has two optional sections. `settings` applies to every
//! target; `targets` holds additional layers keyed by `<account>-<region>`.
//! The key is split at its first `-`, so account ids cannot contain one:
//!
//! ```yaml
//! settings:
//!   domain_name: blog.example.com
//! targets:
//!   123456789012-eu-west-1:
//!     prefix_name: stg
//!     vpc_settings:
//!       number_of_nat_gateways: 2
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfError, ConfResult};
use crate::registry::SettingsKey;
use crate::settings::Settings;

/// Produces the settings for a key the registry has not seen yet.
pub trait SettingsSource: Send + Sync {
    fn settings_for(&self, key: &SettingsKey) -> Settings;
}

/// Built-in defaults, identical for every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl SettingsSource for Defaults {
    fn settings_for(&self, _key: &SettingsKey) -> Settings {
        Settings::default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OverrideFile {
    settings: Value,
    targets: BTreeMap<String, Value>,
}

/// Defaults overlaid with file-wide and per-target overrides.
///
/// All layers are merged and checked when the source is loaded, so a
/// malformed override is reported here and never from a registry lookup.
#[derive(Debug, Clone, Default)]
pub struct LayeredSource {
    base: Settings,
    targets: HashMap<SettingsKey, Settings>,
}

impl LayeredSource {
    /// Load overrides from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfResult<Self> {
        let path = path.as_ref();
        debug!("Loading settings overrides from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load overrides from YAML text.
    pub fn from_yaml(content: &str) -> ConfResult<Self> {
        let file: OverrideFile = if content.trim().is_empty() {
            OverrideFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let mut merged = serde_yaml::to_value(Settings::default())?;
        merge_values(&mut merged, file.settings);
        let base = to_settings("settings", merged.clone())?;

        let mut targets = HashMap::new();
        for (target, overlay) in file.targets {
            let key = parse_target(&target)?;
            let mut layered = merged.clone();
            merge_values(&mut layered, overlay);
            let settings = to_settings(&format!("targets.{}", target), layered)?;
            debug!("Loaded settings override for target {}", key);
            targets.insert(key, settings);
        }

        Ok(Self { base, targets })
    }

    /// Settings shared by every target without its own layer.
    pub fn base(&self) -> &Settings {
        &self.base
    }

    /// Targets with a dedicated layer, as `<account>-<region>` keys.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.targets.keys().map(SettingsKey::composite).collect();
        targets.sort_unstable();
        targets
    }
}

impl SettingsSource for LayeredSource {
    fn settings_for(&self, key: &SettingsKey) -> Settings {
        self.targets.get(key).unwrap_or(&self.base).clone()
    }
}

/// Split a `<account>-<region>` layer key at its first `-`.
fn parse_target(target: &str) -> ConfResult<SettingsKey> {
    match target.trim().split_once('-') {
        Some((account, region)) if !account.is_empty() && !region.is_empty() => {
            Ok(SettingsKey::new(account, region))
        }
        _ => Err(ConfError::InvalidOverride {
            layer: format!("targets.{}", target),
            message: "target key must have the form <account>-<region>".to_string(),
        }),
    }
}

fn to_settings(layer: &str, value: Value) -> ConfResult<Settings> {
    serde_yaml::from_value(value).map_err(|e| ConfError::InvalidOverride {
        layer: layer.to_string(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`. Mappings merge key by key, anything
/// else replaces the base value.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                let nested = value.is_mapping() && base.get(&key).map_or(false, Value::is_mapping);
                if nested {
                    if let Some(existing) = base.get_mut(&key) {
                        merge_values(existing, value);
                    }
                } else {
                    base.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_are_defaults() {
        let source = LayeredSource::from_yaml("").unwrap();
        assert_eq!(source.base(), &Settings::default());
        assert!(source.targets().is_empty());
    }

    #[test]
    fn test_merge_keeps_sibling_fields() {
        let mut base: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 2\n").unwrap();
        let overlay: Value = serde_yaml::from_str("a:\n  c: 3\n").unwrap();
        merge_values(&mut base, overlay);

        let expected: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 3\n").unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn test_import_settings_layer() {
        let yaml = r#"
settings:
  vpc_settings:
    import_settings:
      vpc_id: vpc-123
      security_group_id: sg-123
"#;
        let source = LayeredSource::from_yaml(yaml).unwrap();
        let import = source.base().vpc_settings.import_settings.as_ref().unwrap();
        assert_eq!(import.vpc_id, "vpc-123");
        assert_eq!(source.base().vpc_settings.vpc_cidr_range, "20.0.0.0/16");
    }

    #[test]
    fn test_bad_override_names_layer() {
        let yaml = "targets:\n  1-eu-west-1:\n    vpc_settings:\n      number_of_nat_gateways: many\n";
        let err = LayeredSource::from_yaml(yaml).unwrap_err();
        match err {
            ConfError::InvalidOverride { layer, .. } => assert_eq!(layer, "targets.1-eu-west-1"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_target_keys_split_at_first_dash() {
        let source = LayeredSource::from_yaml("targets:\n  a-b-c:\n    prefix_name: stg\n").unwrap();

        assert_eq!(source.settings_for(&SettingsKey::new("a", "b-c")).prefix_name, "stg");
        assert_eq!(source.settings_for(&SettingsKey::new("a-b", "c")).prefix_name, "");
        assert_eq!(source.targets(), vec!["a-b-c"]);
    }

    #[test]
    fn test_malformed_target_key_rejected() {
        for key in ["111111111111-", "-eu-west-1", "111111111111"] {
            let yaml = format!("targets:\n  '{}':\n    prefix_name: stg\n", key);
            assert!(
                matches!(LayeredSource::from_yaml(&yaml), Err(ConfError::InvalidOverride { .. })),
                "accepted {key:?}"
            );
        }
    }
}
