//! MySQL database for the blog.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ConstructResult;
use crate::handle::Handle;
use crate::scope::ConstructScope;
use crate::template::Resource;
use crate::vpc::NetworkHandle;

pub const MYSQL_ENDPOINT: &str = "rds/mysql/endpoint";

pub const MYSQL_PORT: u16 = 3306;

pub const ADMIN_USERNAME: &str = "dbAdmin";

const EXCLUDED_PASSWORD_CHARACTERS: &str = " %+~=,\"!&*^#@()[]{}\\|;:<>/'$.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseAttributes {
    pub endpoint_address: String,
    pub endpoint_port: String,
    /// Admin credentials as generated at deploy time.
    pub secret_arn: String,
    pub security_group_id: String,
}

pub type DatabaseHandle = Handle<DatabaseAttributes>;

impl Handle<DatabaseAttributes> {
    pub fn endpoint_address(&self) -> &str {
        &self.attributes().endpoint_address
    }

    pub fn endpoint_port(&self) -> &str {
        &self.attributes().endpoint_port
    }

    /// `address:port`.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.endpoint_address(), self.endpoint_port())
    }

    pub fn secret_arn(&self) -> &str {
        &self.attributes().secret_arn
    }

    pub fn security_group_id(&self) -> &str {
        &self.attributes().security_group_id
    }
}

pub struct RdsConstruct;

impl RdsConstruct {
    pub fn resolve(scope: &mut ConstructScope, network: &NetworkHandle) -> ConstructResult<DatabaseHandle> {
        let database_name = scope.settings().database_name.clone();
        info!("Provisioning MySQL instance for {}", database_name);

        let security_group = Resource::new(scope.logical_id("MySQLSecurityGroup"), "AWS::EC2::SecurityGroup")
            .properties(json!({
                "VpcId": network.vpc_id(),
                "GroupDescription": scope.naming().describe("Security Group for access to MySQL Database"),
                "AllowAllOutbound": true,
                "SecurityGroupIngress": [{
                    "CidrIp": network.cidr_block(),
                    "IpProtocol": "tcp",
                    "FromPort": MYSQL_PORT,
                    "ToPort": MYSQL_PORT,
                    "Description": "Allow MySQL Connections From Within the VPC",
                }],
            }));
        let security_group_id = security_group.attr("GroupId");
        let security_group_logical_id = scope.declare(security_group)?;

        let secret_template = json!({ "username": ADMIN_USERNAME }).to_string();
        let secret = Resource::new(scope.logical_id("MySQLInstanceSecret"), "AWS::SecretsManager::Secret")
            .properties(json!({
                "Name": scope.naming().qualify("dbAdminPasswordSecret"),
                "GenerateSecretString": {
                    "SecretStringTemplate": secret_template,
                    "GenerateStringKey": "password",
                    "ExcludeCharacters": EXCLUDED_PASSWORD_CHARACTERS,
                },
            }));
        let secret_arn = secret.attr("Arn");
        let secret_logical_id = scope.declare(secret)?;

        let master_password = format!("{{{{resolve:secretsmanager:{}:SecretString:password}}}}", secret_arn);
        let instance = Resource::new(scope.logical_id("MySQLInstance"), "AWS::RDS::DBInstance")
            .properties(json!({
                "Engine": "mysql",
                "DBInstanceClass": "db.t3.micro",
                "DBName": database_name,
                "MasterUsername": ADMIN_USERNAME,
                "MasterUserPassword": master_password,
                "PubliclyAccessible": false,
                "VPCSecurityGroups": [security_group_id],
            }))
            .depends_on(&security_group_logical_id)
            .depends_on(&secret_logical_id);
        let endpoint_address = instance.attr("Endpoint.Address");
        let endpoint_port = instance.attr("Endpoint.Port");
        let instance_id = instance.attr("Id");
        let instance_logical_id = scope.declare(instance)?;

        // Adds host, port, engine and dbname to the secret the service reads.
        let attachment = Resource::new(
            scope.logical_id("MySQLInstanceSecretAttachment"),
            "AWS::SecretsManager::SecretTargetAttachment",
        )
        .properties(json!({
            "SecretId": secret_arn,
            "TargetId": instance_id,
            "TargetType": "AWS::RDS::DBInstance",
        }))
        .depends_on(&secret_logical_id)
        .depends_on(&instance_logical_id);
        let attachment_logical_id = scope.declare(attachment)?;

        let database = Handle::provisioned(
            instance_logical_id,
            vec![security_group_logical_id, secret_logical_id, attachment_logical_id],
            DatabaseAttributes {
                endpoint_address,
                endpoint_port,
                secret_arn,
                security_group_id,
            },
        );

        scope.publish(
            MYSQL_ENDPOINT,
            database.socket_address(),
            "Endpoint To Connect To MYSQL with",
        )?;

        Ok(database)
    }
}
