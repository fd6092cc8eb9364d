//! Roles assumed by the blog's ECS tasks.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ConstructResult;
use crate::s3::{BucketHandle, BUCKET_ACTIONS};
use crate::scope::ConstructScope;
use crate::template::Resource;

pub const TASK_EXECUTION_ROLE_ARN: &str = "iam/ecstaskexecutionrole/arn";
pub const CONTAINER_ROLE_ARN: &str = "iam/ecscontainerexecutionrole/arn";

const TASK_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// A declared role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOutput {
    pub logical_id: String,
    pub role_name: String,
    pub role_arn: String,
}

/// The task execution role pulls images and writes logs; the container role
/// is what the application itself runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRoles {
    pub task_execution_role: RoleOutput,
    pub container_role: RoleOutput,
}

fn assume_role_policy() -> Value {
    json!({
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "ecs-tasks.amazonaws.com" },
            "Action": "sts:AssumeRole",
        }],
    })
}

pub struct IamConstruct;

impl IamConstruct {
    pub fn resolve(scope: &mut ConstructScope, bucket: &BucketHandle) -> ConstructResult<ServiceRoles> {
        let task_execution_role = Self::role(
            scope,
            "ECSTaskExecutionRole",
            json!({
                "Description": "ECS Task Execution Role",
                "ManagedPolicyArns": [TASK_EXECUTION_POLICY],
            }),
        )?;
        scope.publish(
            TASK_EXECUTION_ROLE_ARN,
            task_execution_role.role_arn.as_str(),
            "ECSTaskExecutionRole ARN",
        )?;

        let container_role = Self::role(
            scope,
            "ContainerServiceRole",
            json!({
                "Description": "Service Role Assumed By Container To Access AWS",
                "Policies": [{
                    "PolicyName": "AssetBucketAccess",
                    "PolicyDocument": {
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": BUCKET_ACTIONS,
                            "Resource": [bucket.bucket_arn(), bucket.arn_for_objects("*")],
                        }],
                    },
                }],
            }),
        )?;
        scope.publish(
            CONTAINER_ROLE_ARN,
            container_role.role_arn.as_str(),
            "ECSContainerExecutionRole ARN",
        )?;

        Ok(ServiceRoles {
            task_execution_role,
            container_role,
        })
    }

    fn role(scope: &mut ConstructScope, name: &str, properties: Value) -> ConstructResult<RoleOutput> {
        let role_name = scope.naming().qualify(name);
        info!("Provisioning role {}", role_name);

        let role = Resource::new(scope.logical_id(name), "AWS::IAM::Role")
            .property("RoleName", role_name.as_str())
            .property("AssumeRolePolicyDocument", assume_role_policy())
            .properties(properties);
        let role_arn = role.attr("Arn");
        let logical_id = scope.declare(role)?;

        Ok(RoleOutput {
            logical_id,
            role_name,
            role_arn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ghost_conf::{Settings, SettingsKey};

    use crate::handle::Handle;
    use crate::lookup::StaticLookup;
    use crate::s3::BucketAttributes;

    #[test]
    fn test_roles_published() {
        let mut scope = ConstructScope::new(
            SettingsKey::new("111111111111", "eu-west-1"),
            Arc::new(Settings::default().with_prefix("stg")),
            Arc::new(StaticLookup::new()),
        )
        .unwrap();
        let bucket = Handle::provisioned(
            "stg-AssetBucket",
            Vec::new(),
            BucketAttributes {
                bucket_name: "${stg-AssetBucket.BucketName}".to_string(),
                bucket_arn: "${stg-AssetBucket.Arn}".to_string(),
                regional_domain_name: "${stg-AssetBucket.RegionalDomainName}".to_string(),
            },
        );

        let roles = IamConstruct::resolve(&mut scope, &bucket).unwrap();

        assert_eq!(roles.task_execution_role.role_name, "stg-ECSTaskExecutionRole");
        assert_eq!(
            scope.parameters().value(TASK_EXECUTION_ROLE_ARN),
            Some("${stg-ECSTaskExecutionRole.Arn}")
        );
        assert_eq!(
            scope.parameters().get(CONTAINER_ROLE_ARN).unwrap().path,
            "/stg/iam/ecscontainerexecutionrole/arn"
        );

        let container = scope.template().get("stg-ContainerServiceRole").unwrap();
        assert_eq!(
            container.properties["Policies"][0]["PolicyDocument"]["Statement"][0]["Resource"],
            json!(["${stg-AssetBucket.Arn}", "${stg-AssetBucket.Arn}/*"])
        );
    }
}
