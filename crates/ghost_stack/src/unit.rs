//! Composition units and what they exchange.

use std::collections::HashMap;

use ghost_constructs::{
    BalancerHandle, BucketHandle, ClusterHandle, ConstructScope, DatabaseHandle, ImageAsset,
    IssuedCertificate, NetworkHandle, ServiceRoles, ZoneHandle,
};
use serde::Serialize;

use crate::error::{StackError, StackResult};
use crate::service::ServiceOutput;

/// Edge of the composition graph, from the dependent unit to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "unit", rename_all = "snake_case")]
pub enum Dependency {
    /// The unit reads the output of `name`.
    Data(String),
    /// The unit only has to be constructed after `name`.
    Order(String),
}

impl Dependency {
    pub fn data(name: impl Into<String>) -> Self {
        Dependency::Data(name.into())
    }

    pub fn order(name: impl Into<String>) -> Self {
        Dependency::Order(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Dependency::Data(name) | Dependency::Order(name) => name,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Dependency::Data(_))
    }
}

/// What a unit hands to the units depending on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UnitOutput {
    Network(NetworkHandle),
    Cluster(ClusterHandle),
    Balancer(BalancerHandle),
    Database(DatabaseHandle),
    Bucket(BucketHandle),
    Roles(ServiceRoles),
    Image(ImageAsset),
    Zone(ZoneHandle),
    Certificates(Vec<IssuedCertificate>),
    Service(ServiceOutput),
    /// Nothing to share.
    Unit,
}

/// A named step of the composition.
///
/// Units are constructed at most once per run, after every unit they depend
/// on. Only the outputs of `Data` dependencies are visible to them.
pub trait Unit: Send + Sync {
    /// Unique unit name, used in dependency declarations.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Default: no dependencies.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput>;
}

/// View of the run handed to one unit.
pub struct UnitContext<'a> {
    unit: &'a str,
    readable: Vec<String>,
    outputs: &'a HashMap<String, UnitOutput>,
    scope: &'a mut ConstructScope,
}

macro_rules! typed_output {
    ($fn_name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $fn_name(&self, dependency: &str) -> StackResult<$ty> {
            match self.output(dependency)? {
                UnitOutput::$variant(value) => Ok(value.clone()),
                _ => Err(StackError::UnexpectedOutput {
                    dependency: dependency.to_string(),
                    expected: $expected,
                }),
            }
        }
    };
}

impl<'a> UnitContext<'a> {
    pub(crate) fn new(
        unit: &'a str,
        dependencies: &[Dependency],
        outputs: &'a HashMap<String, UnitOutput>,
        scope: &'a mut ConstructScope,
    ) -> Self {
        let readable = dependencies
            .iter()
            .filter(|d| d.is_data())
            .map(|d| d.name().to_string())
            .collect();
        Self {
            unit,
            readable,
            outputs,
            scope,
        }
    }

    pub fn unit(&self) -> &str {
        self.unit
    }

    pub fn scope(&mut self) -> &mut ConstructScope {
        self.scope
    }

    /// Output of a data dependency.
    pub fn output(&self, dependency: &str) -> StackResult<&UnitOutput> {
        let missing = || StackError::MissingOutput {
            unit: self.unit.to_string(),
            dependency: dependency.to_string(),
        };
        if !self.readable.iter().any(|name| name == dependency) {
            return Err(missing());
        }
        self.outputs.get(dependency).ok_or_else(missing)
    }

    typed_output!(network, Network, NetworkHandle, "network");
    typed_output!(cluster, Cluster, ClusterHandle, "cluster");
    typed_output!(balancer, Balancer, BalancerHandle, "balancer");
    typed_output!(database, Database, DatabaseHandle, "database");
    typed_output!(bucket, Bucket, BucketHandle, "bucket");
    typed_output!(roles, Roles, ServiceRoles, "set of roles");
    typed_output!(image, Image, ImageAsset, "image");
    typed_output!(zone, Zone, ZoneHandle, "hosted zone");
    typed_output!(certificates, Certificates, Vec<IssuedCertificate>, "certificate list");
}
