//! Import lookup collaborator.
//!
//! Resolves the identifier of an existing resource to its description. It is
//! only consulted for imported resources, as one blocking call per resource.
//! Retries, if any, belong to the implementation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConstructError, ConstructResult};

/// Attribute names used in lookup descriptions.
pub mod attributes {
    pub const CIDR_BLOCK: &str = "cidr_block";
    pub const DNS_NAME: &str = "dns_name";
    pub const CANONICAL_HOSTED_ZONE_ID: &str = "canonical_hosted_zone_id";
}

/// Kinds of resources that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpc,
    Cluster,
    LoadBalancer,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Cluster => "cluster",
            ResourceKind::LoadBalancer => "load_balancer",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Description of an existing resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub kind: ResourceKind,
    pub identifier: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ResourceDescription {
    pub fn new(kind: ResourceKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }

    /// Get an attribute the caller cannot do without.
    pub fn require(&self, key: &str) -> ConstructResult<&str> {
        self.attribute(key)
            .ok_or_else(|| ConstructError::ImportLookupIncomplete {
                kind: self.kind,
                identifier: self.identifier.clone(),
                attribute: key.to_string(),
            })
    }
}

/// Resolves identifiers of existing resources.
#[cfg_attr(test, mockall::automock)]
pub trait ImportLookup: Send + Sync {
    /// Describe the resource, or fail with `ImportLookupNotFound`.
    fn lookup(&self, kind: ResourceKind, identifier: &str) -> ConstructResult<ResourceDescription>;
}

/// Lookup answered from a fixed set of known resources, such as a cached
/// lookup context file.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    resources: HashMap<(ResourceKind, String), ResourceDescription>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known resource.
    pub fn with(mut self, description: ResourceDescription) -> Self {
        self.insert(description);
        self
    }

    pub fn insert(&mut self, description: ResourceDescription) {
        self.resources.insert(
            (description.kind, description.identifier.clone()),
            description,
        );
    }

    /// Load a YAML list of resource descriptions.
    pub fn from_file(path: impl AsRef<Path>) -> ConstructResult<Self> {
        let path = path.as_ref();
        debug!("Loading lookup context from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ConstructResult<Self> {
        let descriptions: Vec<ResourceDescription> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(descriptions
            .into_iter()
            .fold(Self::new(), |lookup, description| lookup.with(description)))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ImportLookup for StaticLookup {
    fn lookup(&self, kind: ResourceKind, identifier: &str) -> ConstructResult<ResourceDescription> {
        self.resources
            .get(&(kind, identifier.to_string()))
            .cloned()
            .ok_or_else(|| ConstructError::ImportLookupNotFound {
                kind,
                identifier: identifier.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_lookup_found() {
        let lookup = StaticLookup::new().with(
            ResourceDescription::new(ResourceKind::Vpc, "vpc-1")
                .with_attribute(attributes::CIDR_BLOCK, "10.0.0.0/16"),
        );

        let description = lookup.lookup(ResourceKind::Vpc, "vpc-1").unwrap();
        assert_eq!(description.require(attributes::CIDR_BLOCK).unwrap(), "10.0.0.0/16");
    }

    #[test]
    fn test_static_lookup_not_found() {
        let lookup = StaticLookup::new()
            .with(ResourceDescription::new(ResourceKind::Vpc, "vpc-1"));

        // Same identifier, different kind.
        let err = lookup.lookup(ResourceKind::LoadBalancer, "vpc-1").unwrap_err();
        assert!(matches!(
            err,
            ConstructError::ImportLookupNotFound { kind: ResourceKind::LoadBalancer, .. }
        ));
    }

    #[test]
    fn test_missing_attribute() {
        let description = ResourceDescription::new(ResourceKind::LoadBalancer, "arn:alb");
        let err = description.require(attributes::DNS_NAME).unwrap_err();
        assert!(err.to_string().contains("dns_name"));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
- kind: vpc
  identifier: vpc-1
  attributes:
    cidr_block: 10.0.0.0/16
- kind: load_balancer
  identifier: "arn:aws:elasticloadbalancing:alb"
  attributes:
    dns_name: alb.example.com
    canonical_hosted_zone_id: Z123
"#;
        let lookup = StaticLookup::from_yaml(yaml).unwrap();
        assert_eq!(lookup.len(), 2);
        let alb = lookup
            .lookup(ResourceKind::LoadBalancer, "arn:aws:elasticloadbalancing:alb")
            .unwrap();
        assert_eq!(alb.attribute(attributes::DNS_NAME), Some("alb.example.com"));
    }
}
