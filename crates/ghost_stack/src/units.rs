//! Units of the ghost blog stack.

use ghost_constructs::{
    AcmConstruct, AlbConstruct, EcsConstruct, IamConstruct, ImageConstruct, RdsConstruct,
    Route53Construct, S3Construct, VpcConstruct,
};

use crate::error::StackResult;
use crate::graph::CompositionGraph;
use crate::service::ServiceUnit;
use crate::unit::{Dependency, Unit, UnitContext, UnitOutput};

/// Unit names, as used in dependency declarations.
pub mod names {
    pub const NETWORK: &str = "network";
    pub const CLUSTER: &str = "cluster";
    pub const IMAGE: &str = "image";
    pub const ASSETS: &str = "assets";
    pub const IAM: &str = "iam";
    pub const DATABASE: &str = "database";
    pub const BALANCER: &str = "balancer";
    pub const DNS: &str = "dns";
    pub const CERTIFICATES: &str = "certificates";
    pub const SERVICE: &str = "service";
}

pub struct NetworkUnit;

impl Unit for NetworkUnit {
    fn name(&self) -> &str {
        names::NETWORK
    }

    fn description(&self) -> &str {
        "VPC, service endpoints and the common security group"
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        Ok(UnitOutput::Network(VpcConstruct::resolve(context.scope())?))
    }
}

pub struct ClusterUnit;

impl Unit for ClusterUnit {
    fn name(&self) -> &str {
        names::CLUSTER
    }

    fn description(&self) -> &str {
        "ECS cluster"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::NETWORK)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let network = context.network(names::NETWORK)?;
        Ok(UnitOutput::Cluster(EcsConstruct::resolve(context.scope(), &network)?))
    }
}

pub struct ImageUnit;

impl Unit for ImageUnit {
    fn name(&self) -> &str {
        names::IMAGE
    }

    fn description(&self) -> &str {
        "Container image repository, pullable by the task execution role"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::IAM)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let roles = context.roles(names::IAM)?;
        let image = ImageConstruct::resolve(context.scope(), &roles.task_execution_role)?;
        Ok(UnitOutput::Image(image))
    }
}

pub struct AssetsUnit;

impl Unit for AssetsUnit {
    fn name(&self) -> &str {
        names::ASSETS
    }

    fn description(&self) -> &str {
        "Asset bucket and its content deployment"
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        Ok(UnitOutput::Bucket(S3Construct::resolve(context.scope())?))
    }
}

pub struct IamUnit;

impl Unit for IamUnit {
    fn name(&self) -> &str {
        names::IAM
    }

    fn description(&self) -> &str {
        "Task execution and container roles"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::ASSETS)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let bucket = context.bucket(names::ASSETS)?;
        Ok(UnitOutput::Roles(IamConstruct::resolve(context.scope(), &bucket)?))
    }
}

pub struct DatabaseUnit;

impl Unit for DatabaseUnit {
    fn name(&self) -> &str {
        names::DATABASE
    }

    fn description(&self) -> &str {
        "MySQL instance reachable from the VPC"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::NETWORK)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let network = context.network(names::NETWORK)?;
        Ok(UnitOutput::Database(RdsConstruct::resolve(context.scope(), &network)?))
    }
}

pub struct BalancerUnit;

impl Unit for BalancerUnit {
    fn name(&self) -> &str {
        names::BALANCER
    }

    fn description(&self) -> &str {
        "Application load balancer with HTTPS listener"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::NETWORK)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let network = context.network(names::NETWORK)?;
        Ok(UnitOutput::Balancer(AlbConstruct::resolve(context.scope(), &network)?))
    }
}

pub struct DnsUnit;

impl Unit for DnsUnit {
    fn name(&self) -> &str {
        names::DNS
    }

    fn description(&self) -> &str {
        "Hosted zone with records aliased to the load balancer"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::BALANCER)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let balancer = context.balancer(names::BALANCER)?;
        Ok(UnitOutput::Zone(Route53Construct::resolve(context.scope(), &balancer)?))
    }
}

pub struct CertificatesUnit;

impl Unit for CertificatesUnit {
    fn name(&self) -> &str {
        names::CERTIFICATES
    }

    fn description(&self) -> &str {
        "DNS validated certificates for the zone's domains"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::data(names::DNS)]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let zone = context.zone(names::DNS)?;
        Ok(UnitOutput::Certificates(AcmConstruct::resolve(context.scope(), &zone)?))
    }
}

/// The full ghost blog composition.
pub fn ghost_blog_graph() -> StackResult<CompositionGraph> {
    let mut graph = CompositionGraph::new();
    graph.register(Box::new(NetworkUnit))?;
    graph.register(Box::new(ClusterUnit))?;
    graph.register(Box::new(ImageUnit))?;
    graph.register(Box::new(AssetsUnit))?;
    graph.register(Box::new(IamUnit))?;
    graph.register(Box::new(DatabaseUnit))?;
    graph.register(Box::new(BalancerUnit))?;
    graph.register(Box::new(DnsUnit))?;
    graph.register(Box::new(CertificatesUnit))?;
    graph.register(Box::new(ServiceUnit))?;
    Ok(graph)
}
