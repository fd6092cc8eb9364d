//! Asset bucket holding the blog's static content.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ConstructResult;
use crate::handle::Handle;
use crate::scope::ConstructScope;
use crate::template::Resource;

/// Object actions granted on the bucket to the account and to the container.
pub const BUCKET_ACTIONS: &[&str] = &[
    "s3:ListBucket",
    "s3:PutObject",
    "s3:GetObject",
    "s3:PutObjectVersionAcl",
    "s3:DeleteObject",
    "s3:PutObjectAcl",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketAttributes {
    pub bucket_name: String,
    pub bucket_arn: String,
    pub regional_domain_name: String,
}

pub type BucketHandle = Handle<BucketAttributes>;

impl Handle<BucketAttributes> {
    pub fn bucket_name(&self) -> &str {
        &self.attributes().bucket_name
    }

    pub fn bucket_arn(&self) -> &str {
        &self.attributes().bucket_arn
    }

    pub fn regional_domain_name(&self) -> &str {
        &self.attributes().regional_domain_name
    }

    /// ARN pattern matching every object in the bucket.
    pub fn arn_for_objects(&self, pattern: &str) -> String {
        format!("{}/{}", self.bucket_arn(), pattern)
    }
}

pub struct S3Construct;

impl S3Construct {
    pub fn resolve(scope: &mut ConstructScope) -> ConstructResult<BucketHandle> {
        info!("Provisioning asset bucket");

        let bucket = Resource::new(scope.logical_id("AssetBucket"), "AWS::S3::Bucket").properties(json!({
            "BucketEncryption": "S3_MANAGED",
            "EnforceSSL": true,
            "BlockPublicAccess": "BLOCK_ACLS",
            "ObjectOwnership": "BucketOwnerEnforced",
            "RemovalPolicy": "destroy",
            "AutoDeleteObjects": true,
        }));
        let handle_attributes = BucketAttributes {
            bucket_name: bucket.attr("BucketName"),
            bucket_arn: bucket.attr("Arn"),
            regional_domain_name: bucket.attr("RegionalDomainName"),
        };
        let bucket_id = scope.declare(bucket)?;
        let account_principal = format!("arn:aws:iam::{}:root", scope.target().account);

        let policy = Resource::new(scope.logical_id("AssetBucketPolicy"), "AWS::S3::BucketPolicy")
            .properties(json!({
                "Bucket": handle_attributes.bucket_name,
                "PolicyDocument": {
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "AWS": account_principal },
                        "Action": BUCKET_ACTIONS,
                        "Resource": [
                            format!("{}/*", handle_attributes.bucket_arn),
                            handle_attributes.bucket_arn,
                        ],
                    }],
                },
            }))
            .depends_on(&bucket_id);
        let policy_id = scope.declare(policy)?;

        let deployment = Resource::new(
            scope.logical_id("AssetBucketDeployment"),
            "Custom::CDKBucketDeployment",
        )
        .properties(json!({
            "DestinationBucketName": handle_attributes.bucket_name,
            "MemoryLimit": 2048,
            "EphemeralStorageSize": 1024,
            "Prune": false,
            "RetainOnDelete": false,
        }))
        .depends_on(&bucket_id);
        let deployment_id = scope.declare(deployment)?;

        Ok(Handle::provisioned(
            bucket_id,
            vec![policy_id, deployment_id],
            handle_attributes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ghost_conf::{Settings, SettingsKey};

    use crate::lookup::StaticLookup;

    #[test]
    fn test_bucket_policy_and_deployment() {
        let mut scope = ConstructScope::new(
            SettingsKey::new("123456789012", "eu-west-1"),
            Arc::new(Settings::default().with_prefix("stg")),
            Arc::new(StaticLookup::new()),
        )
        .unwrap();

        let bucket = S3Construct::resolve(&mut scope).unwrap();

        assert_eq!(bucket.arn_for_objects("*"), "${stg-AssetBucket.Arn}/*");
        assert!(scope.parameters().is_empty());

        let policy = scope.template().get("stg-AssetBucketPolicy").unwrap();
        let statement = &policy.properties["PolicyDocument"]["Statement"][0];
        assert_eq!(statement["Principal"]["AWS"], json!("arn:aws:iam::123456789012:root"));
        assert_eq!(statement["Action"].as_array().map(Vec::len), Some(6));

        let deployment = scope.template().get("stg-AssetBucketDeployment").unwrap();
        assert_eq!(deployment.depends_on, vec!["stg-AssetBucket".to_string()]);
    }
}
