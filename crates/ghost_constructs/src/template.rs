//! Declared resources and stack outputs of a composition run.
//!
//! Only provisioned resources are ever declared here. Attribute values of a
//! resource that does not exist yet are written as `${LogicalId.Attribute}`
//! references, resolved by the deployment tooling.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConstructError, ConstructResult};

/// Reference to an attribute of a declared resource.
pub fn reference(logical_id: &str, attribute: &str) -> String {
    format!("${{{}.{}}}", logical_id, attribute)
}

/// A resource to be provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub logical_id: String,
    pub resource_type: String,
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Resource {
    pub fn new(logical_id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type: resource_type.into(),
            properties: Map::new(),
            depends_on: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Merge the fields of a JSON object into the properties.
    pub fn properties(mut self, value: Value) -> Self {
        if let Value::Object(map) = value {
            self.properties.extend(map);
        }
        self
    }

    pub fn depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }

    /// Reference to one of this resource's attributes.
    pub fn attr(&self, attribute: &str) -> String {
        reference(&self.logical_id, attribute)
    }
}

/// A named value exported by the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub id: String,
    pub value: String,
    pub description: String,
}

/// Ordered set of declared resources and outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    resources: Vec<Resource>,
    outputs: Vec<StackOutput>,
    #[serde(skip)]
    tags: BTreeMap<String, String>,
    #[serde(skip)]
    logical_ids: HashSet<String>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag applied to every resource declared afterwards.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Declare a resource. Logical ids are unique within a template.
    pub fn declare(&mut self, mut resource: Resource) -> ConstructResult<String> {
        if !self.logical_ids.insert(resource.logical_id.clone()) {
            return Err(ConstructError::DuplicateLogicalId(resource.logical_id));
        }

        for (key, value) in &self.tags {
            resource
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        debug!(
            "Declaring {} ({})",
            resource.logical_id, resource.resource_type
        );
        let logical_id = resource.logical_id.clone();
        self.resources.push(resource);
        Ok(logical_id)
    }

    pub fn add_output(
        &mut self,
        id: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.outputs.push(StackOutput {
            id: id.into(),
            value: value.into(),
            description: description.into(),
        });
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.logical_ids.contains(logical_id)
    }

    /// Declared resources of the given type.
    pub fn of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.resource_type == resource_type)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
