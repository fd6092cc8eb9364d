//! Network resolver.

use ghost_conf::{parse_ipv4_cidr, VpcImportSettings, VpcSettings};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ConstructResult;
use crate::handle::{decide, Decision, Handle};
use crate::lookup::{attributes, ResourceKind};
use crate::scope::ConstructScope;
use crate::template::Resource;

pub const VPC_ID: &str = "vpc/id";
pub const VPC_CIDR: &str = "vpc/cidr";
pub const VPC_SECURITY_GROUP_ID: &str = "vpc/sg/id";

const GATEWAY_ENDPOINTS: &[(&str, &str)] = &[("CommonVPCS3Endpoint", "s3")];

const INTERFACE_ENDPOINTS: &[(&str, &str)] = &[
    ("CommonVPCECRDockerEndpoint", "ecr.dkr"),
    ("CommonVPCECREndpoint", "ecr.api"),
    ("CommonVPCSecretsManagerEndpoint", "secretsmanager"),
    ("CommonVPCCloudWatchEndpoint", "logs"),
];

/// Identifiers of the network every other resource lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkAttributes {
    pub vpc_id: String,
    pub cidr_block: String,
    pub security_group_id: String,
}

pub type NetworkHandle = Handle<NetworkAttributes>;

impl Handle<NetworkAttributes> {
    pub fn vpc_id(&self) -> &str {
        &self.attributes().vpc_id
    }

    pub fn cidr_block(&self) -> &str {
        &self.attributes().cidr_block
    }

    pub fn security_group_id(&self) -> &str {
        &self.attributes().security_group_id
    }
}

/// Imports the configured VPC or provisions a new one.
pub struct VpcConstruct;

impl VpcConstruct {
    pub fn resolve(scope: &mut ConstructScope) -> ConstructResult<NetworkHandle> {
        let settings = scope.settings();
        let network = match decide(settings.vpc_settings.import_settings.as_ref()) {
            Decision::Import(import) => Self::import(scope, import)?,
            Decision::Provision => Self::provision(scope, &settings.vpc_settings)?,
        };

        scope.publish(
            VPC_SECURITY_GROUP_ID,
            network.security_group_id(),
            "The Common VPC Security Group",
        )?;
        scope.publish(VPC_CIDR, network.cidr_block(), "The Common VPC CIDR")?;
        scope.publish(VPC_ID, network.vpc_id(), "The Common VPC ID")?;

        Ok(network)
    }

    fn import(scope: &ConstructScope, import: &VpcImportSettings) -> ConstructResult<NetworkHandle> {
        info!("Importing VPC {}", import.vpc_id);
        let description = scope.lookup(ResourceKind::Vpc, &import.vpc_id)?;

        Ok(Handle::imported(NetworkAttributes {
            vpc_id: import.vpc_id.clone(),
            cidr_block: description.require(attributes::CIDR_BLOCK)?.to_string(),
            security_group_id: import.security_group_id.clone(),
        }))
    }

    fn provision(scope: &mut ConstructScope, vpc: &VpcSettings) -> ConstructResult<NetworkHandle> {
        parse_ipv4_cidr(&vpc.vpc_cidr_range)?;
        info!("Provisioning VPC {}", vpc.vpc_cidr_range);

        let vpc_resource = Resource::new(scope.logical_id("CommonVPC"), "AWS::EC2::VPC").properties(json!({
            "CidrBlock": vpc.vpc_cidr_range,
            "NatGateways": vpc.number_of_nat_gateways,
            "EnableDnsHostnames": true,
            "EnableDnsSupport": true,
        }));
        let vpc_id = vpc_resource.attr("VpcId");
        let vpc_logical_id = scope.declare(vpc_resource)?;

        let mut children = Vec::new();

        if vpc.enable_service_endpoints {
            let region = scope.target().region.clone();
            for (name, service) in GATEWAY_ENDPOINTS {
                let endpoint = Resource::new(scope.logical_id(name), "AWS::EC2::VPCEndpoint")
                    .properties(json!({
                        "VpcId": vpc_id,
                        "ServiceName": format!("com.amazonaws.{}.{}", region, service),
                        "VpcEndpointType": "Gateway",
                    }))
                    .depends_on(&vpc_logical_id);
                children.push(scope.declare(endpoint)?);
            }
            for (name, service) in INTERFACE_ENDPOINTS {
                let endpoint = Resource::new(scope.logical_id(name), "AWS::EC2::VPCEndpoint")
                    .properties(json!({
                        "VpcId": vpc_id,
                        "ServiceName": format!("com.amazonaws.{}.{}", region, service),
                        "VpcEndpointType": "Interface",
                        "PrivateDnsEnabled": true,
                    }))
                    .depends_on(&vpc_logical_id);
                children.push(scope.declare(endpoint)?);
            }
        }

        let security_group = Resource::new(
            scope.logical_id("CommonVPCSecurityGroup"),
            "AWS::EC2::SecurityGroup",
        )
        .properties(json!({
            "VpcId": vpc_id,
            "GroupDescription": scope.naming().describe("CommonVPC Security Group"),
            "AllowAllOutbound": true,
        }))
        .depends_on(&vpc_logical_id);
        let security_group_id = security_group.attr("GroupId");
        children.push(scope.declare(security_group)?);

        Ok(Handle::provisioned(
            vpc_logical_id,
            children,
            NetworkAttributes {
                vpc_id,
                cidr_block: vpc.vpc_cidr_range.clone(),
                security_group_id,
            },
        ))
    }
}
