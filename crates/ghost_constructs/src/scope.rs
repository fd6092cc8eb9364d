//! Shared state of one composition run.
//!
//! The scope owns the settings snapshot, the naming rules, the parameter
//! registry and the template. Every construct receives it mutably and
//! records its side effects through it.

use std::sync::Arc;

use ghost_conf::{Settings, SettingsKey};
use tracing::debug;

use crate::error::ConstructResult;
use crate::lookup::{ImportLookup, ResourceDescription, ResourceKind};
use crate::naming::Naming;
use crate::parameter::{parameter_reference, ParameterRegistry};
use crate::template::{Resource, Template};

/// Tag carried by every provisioned resource.
pub const PROJECT_TAG: (&str, &str) = ("Project", "ghostblog");

pub struct ConstructScope {
    target: SettingsKey,
    settings: Arc<Settings>,
    naming: Naming,
    parameters: ParameterRegistry,
    template: Template,
    lookup: Arc<dyn ImportLookup>,
}

impl ConstructScope {
    /// Create a scope for `target`. Fails if the configured prefix cannot be
    /// used in parameter paths.
    pub fn new(
        target: SettingsKey,
        settings: Arc<Settings>,
        lookup: Arc<dyn ImportLookup>,
    ) -> ConstructResult<Self> {
        let parameters = ParameterRegistry::new(settings.prefix_name.clone())?;
        let naming = Naming::new(settings.prefix_name.clone());
        let template = Template::new().with_tag(PROJECT_TAG.0, PROJECT_TAG.1);

        Ok(Self {
            target,
            settings,
            naming,
            parameters,
            template,
            lookup,
        })
    }

    pub fn target(&self) -> &SettingsKey {
        &self.target
    }

    /// The settings snapshot shared by every construct of the run.
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Prefix-qualified logical id.
    pub fn logical_id(&self, name: &str) -> String {
        self.naming.qualify(name)
    }

    /// Declare a resource to provision. Returns its logical id.
    pub fn declare(&mut self, resource: Resource) -> ConstructResult<String> {
        self.template.declare(resource)
    }

    /// Publish a parameter and export the same value as a stack output.
    pub fn publish(
        &mut self,
        suffix: &str,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> ConstructResult<String> {
        let value = value.into();
        let description = description.into();
        let path = self
            .parameters
            .publish(suffix, value.clone(), description.clone())?;
        self.template
            .add_output(output_id(&path), value, description);
        Ok(path)
    }

    /// Deploy-time reference to a parameter that may not be published yet.
    pub fn parameter_reference(&self, suffix: &str) -> String {
        parameter_reference(&self.parameters.path_for(suffix))
    }

    /// Describe an existing resource through the lookup collaborator.
    pub fn lookup(&self, kind: ResourceKind, identifier: &str) -> ConstructResult<ResourceDescription> {
        debug!("Looking up imported {} {}", kind, identifier);
        self.lookup.lookup(kind, identifier)
    }

    pub fn parameters(&self) -> &ParameterRegistry {
        &self.parameters
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn into_parts(self) -> (ParameterRegistry, Template) {
        (self.parameters, self.template)
    }
}

impl std::fmt::Debug for ConstructScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructScope")
            .field("target", &self.target)
            .field("prefix", &self.naming.prefix())
            .field("parameters", &self.parameters.len())
            .field("resources", &self.template.len())
            .finish()
    }
}

/// `/stg/vpc/id` becomes `Output-stg-vpc-id`.
fn output_id(path: &str) -> String {
    format!("Output-{}", path.trim_start_matches('/').replace('/', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookup;

    fn scope(prefix: &str) -> ConstructScope {
        ConstructScope::new(
            SettingsKey::new("111111111111", "eu-west-1"),
            Arc::new(Settings::default().with_prefix(prefix)),
            Arc::new(StaticLookup::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_publish_adds_output() {
        let mut scope = scope("stg");
        let path = scope.publish("vpc/id", "vpc-1", "The Common VPC ID").unwrap();

        assert_eq!(path, "/stg/vpc/id");
        let output = &scope.template().outputs()[0];
        assert_eq!(output.id, "Output-stg-vpc-id");
        assert_eq!(output.value, "vpc-1");
    }

    #[test]
    fn test_declared_resources_are_tagged() {
        let mut scope = scope("");
        let id = scope.logical_id("AssetBucket");
        scope.declare(Resource::new(&id, "AWS::S3::Bucket")).unwrap();

        let bucket = scope.template().get("AssetBucket").unwrap();
        assert_eq!(bucket.tags.get("Project").map(String::as_str), Some("ghostblog"));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let result = ConstructScope::new(
            SettingsKey::new("111111111111", "eu-west-1"),
            Arc::new(Settings::default().with_prefix("a/b")),
            Arc::new(StaticLookup::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parameter_reference_is_prefixed() {
        let scope = scope("stg");
        assert_eq!(
            scope.parameter_reference("acm/example.com/arn"),
            "{{resolve:ssm:/stg/acm/example.com/arn}}"
        );
    }
}
