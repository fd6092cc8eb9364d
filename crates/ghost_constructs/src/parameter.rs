//! Parameter registry.
//!
//! Resolved identifiers are published under hierarchical paths so other
//! deployments can discover them. Every path goes through [`path_for_prefix`]:
//! `/<prefix>/<suffix>` with a prefix, `/<suffix>` without one.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConstructError, ConstructResult};

const PREFIX_PATTERN: &str = r"^[A-Za-z0-9_.\-]*$";

/// Storage tier of a published parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterTier {
    #[default]
    Standard,
    Advanced,
}

/// A published parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub path: String,
    pub value: String,
    pub description: String,
    pub tier: ParameterTier,
}

/// Compute the registry path of `suffix` under `prefix`.
pub fn path_for_prefix(prefix: &str, suffix: &str) -> String {
    let suffix = suffix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("/{}/{}", prefix, suffix)
    }
}

/// Deploy-time reference to the value stored at `path`.
pub fn parameter_reference(path: &str) -> String {
    format!("{{{{resolve:ssm:{}}}}}", path)
}

/// Write-once store of the parameters published during one composition run.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    prefix: String,
    entries: Vec<ParameterEntry>,
    paths: HashSet<String>,
}

impl ParameterRegistry {
    /// Create a registry publishing under `prefix` (may be empty).
    pub fn new(prefix: impl Into<String>) -> ConstructResult<Self> {
        let prefix = prefix.into();
        let valid = Regex::new(PREFIX_PATTERN)
            .ok()
            .map_or(false, |re| re.is_match(&prefix));
        if !valid {
            return Err(ConstructError::InvalidPrefix(prefix));
        }

        Ok(Self {
            prefix,
            entries: Vec::new(),
            paths: HashSet::new(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Predict the path `suffix` is (or will be) published under.
    pub fn path_for(&self, suffix: &str) -> String {
        path_for_prefix(&self.prefix, suffix)
    }

    /// Publish a value under the prefixed path of `suffix`.
    ///
    /// Returns the computed path. Publishing the same path twice in one run
    /// is an error.
    pub fn publish(
        &mut self,
        suffix: &str,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> ConstructResult<String> {
        let path = self.path_for(suffix);
        if !self.paths.insert(path.clone()) {
            return Err(ConstructError::DuplicatePath(path));
        }

        debug!("Publishing parameter {}", path);
        self.entries.push(ParameterEntry {
            path: path.clone(),
            value: value.into(),
            description: description.into(),
            tier: ParameterTier::Standard,
        });
        Ok(path)
    }

    /// Get the entry published for `suffix`.
    pub fn get(&self, suffix: &str) -> Option<&ParameterEntry> {
        let path = self.path_for(suffix);
        self.entries.iter().find(|e| e.path == path)
    }

    /// Get the value published for `suffix`.
    pub fn value(&self, suffix: &str) -> Option<&str> {
        self.get(suffix).map(|e| e.value.as_str())
    }

    /// Entries in publication order.
    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ParameterEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
