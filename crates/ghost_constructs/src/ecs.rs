//! Container cluster resolver.

use ghost_conf::ClusterImportSettings;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ConstructResult;
use crate::handle::{decide, Decision, Handle};
use crate::scope::ConstructScope;
use crate::template::Resource;
use crate::vpc::NetworkHandle;

pub const CLUSTER_ARN: &str = "ecs/cluster/arn";
pub const CLUSTER_NAME: &str = "ecs/cluster/name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAttributes {
    pub cluster_name: String,
    pub cluster_arn: String,
    pub vpc_id: String,
    pub security_group_ids: Vec<String>,
}

pub type ClusterHandle = Handle<ClusterAttributes>;

impl Handle<ClusterAttributes> {
    pub fn cluster_name(&self) -> &str {
        &self.attributes().cluster_name
    }

    pub fn cluster_arn(&self) -> &str {
        &self.attributes().cluster_arn
    }

    pub fn vpc_id(&self) -> &str {
        &self.attributes().vpc_id
    }

    pub fn security_group_ids(&self) -> &[String] {
        &self.attributes().security_group_ids
    }
}

/// Imports the configured ECS cluster or provisions one in the network.
///
/// Cluster imports are attribute based; the supplied identifiers are used
/// as they are without a lookup.
pub struct EcsConstruct;

impl EcsConstruct {
    pub fn resolve(scope: &mut ConstructScope, network: &NetworkHandle) -> ConstructResult<ClusterHandle> {
        let settings = scope.settings();
        let cluster = match decide(settings.ecs_settings.import_settings.as_ref()) {
            Decision::Import(import) => Self::import(import, network),
            Decision::Provision => Self::provision(scope, network)?,
        };

        scope.publish(CLUSTER_ARN, cluster.cluster_arn(), "ECS Cluster ARN")?;
        scope.publish(CLUSTER_NAME, cluster.cluster_name(), "ECS Cluster Name")?;

        Ok(cluster)
    }

    fn import(import: &ClusterImportSettings, network: &NetworkHandle) -> ClusterHandle {
        info!("Importing ECS cluster {}", import.cluster_name);
        if !Self::shares_network(import, network) {
            warn!(
                "Imported cluster {} is in {}, but the network resolved to {}",
                import.cluster_name,
                import.vpc_id,
                network.vpc_id()
            );
        }

        Handle::imported(ClusterAttributes {
            cluster_name: import.cluster_name.clone(),
            cluster_arn: import.cluster_arn.clone(),
            vpc_id: import.vpc_id.clone(),
            security_group_ids: import.security_group_ids.clone(),
        })
    }

    /// Whether the imported cluster sits in the resolved network. A
    /// provisioned network has no id yet, so it always matches.
    fn shares_network(import: &ClusterImportSettings, network: &NetworkHandle) -> bool {
        !network.is_imported() || import.vpc_id == network.vpc_id()
    }

    fn provision(scope: &mut ConstructScope, network: &NetworkHandle) -> ConstructResult<ClusterHandle> {
        let cluster_name = scope.naming().qualify("ghostblog-cluster");
        info!("Provisioning ECS cluster {}", cluster_name);

        let cluster = Resource::new(scope.logical_id("Cluster"), "AWS::ECS::Cluster").properties(json!({
            "ClusterName": cluster_name,
            "VpcId": network.vpc_id(),
        }));
        let cluster_arn = cluster.attr("Arn");
        let logical_id = scope.declare(cluster)?;

        Ok(Handle::provisioned(
            logical_id,
            Vec::new(),
            ClusterAttributes {
                cluster_name,
                cluster_arn,
                vpc_id: network.vpc_id().to_string(),
                security_group_ids: vec![network.security_group_id().to_string()],
            },
        ))
    }
}
