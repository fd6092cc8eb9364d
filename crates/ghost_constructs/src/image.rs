//! Container image asset of the blog.
//!
//! Building the image is left to the deployment tooling; only the repository
//! and the pull grant are declared here.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ConstructResult;
use crate::iam::RoleOutput;
use crate::scope::ConstructScope;
use crate::template::Resource;

pub const IMAGE_NAME: &str = "ghostblog";

const PULL_ACTIONS: &[&str] = &[
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
];

/// Parameter suffix of the image URI for `name`.
pub fn image_uri_suffix(name: &str) -> String {
    format!("ecr/{}/uri", name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub logical_id: String,
    pub repository_arn: String,
    pub image_uri: String,
}

pub struct ImageConstruct;

impl ImageConstruct {
    /// Declare the image repository and let `pull_role` pull from it.
    pub fn resolve(scope: &mut ConstructScope, pull_role: &RoleOutput) -> ConstructResult<ImageAsset> {
        let repository_name = scope.naming().qualify(IMAGE_NAME);
        info!("Declaring image asset {}", repository_name);

        let repository = Resource::new(scope.logical_id("GhostImage"), "AWS::ECR::Repository")
            .properties(json!({
                "RepositoryName": repository_name,
                "ImageScanningConfiguration": { "ScanOnPush": true },
            }));
        let repository_arn = repository.attr("Arn");
        let image_uri = format!("{}:latest", repository.attr("RepositoryUri"));
        let logical_id = scope.declare(repository)?;

        let grant = Resource::new(scope.logical_id("GhostImagePullPolicy"), "AWS::IAM::Policy")
            .properties(json!({
                "PolicyName": scope.naming().qualify("GhostImagePull"),
                "Roles": [pull_role.role_name],
                "PolicyDocument": {
                    "Statement": [
                        { "Effect": "Allow", "Action": PULL_ACTIONS, "Resource": repository_arn },
                        { "Effect": "Allow", "Action": "ecr:GetAuthorizationToken", "Resource": "*" },
                    ],
                },
            }))
            .depends_on(&logical_id)
            .depends_on(&pull_role.logical_id);
        scope.declare(grant)?;

        scope.publish(
            &image_uri_suffix(IMAGE_NAME),
            image_uri.as_str(),
            "Ghost Container Image URI",
        )?;

        Ok(ImageAsset {
            logical_id,
            repository_arn,
            image_uri,
        })
    }
}
