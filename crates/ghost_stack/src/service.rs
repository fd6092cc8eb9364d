//! The Ghost application service.
//!
//! Wires the task definition, container, Fargate service, target group and
//! host based listener rules out of the other units' outputs.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use ghost_constructs::{image_uri_suffix, Resource, IMAGE_NAME};

use crate::error::StackResult;
use crate::unit::{Dependency, Unit, UnitContext, UnitOutput};
use crate::units::names;

pub const CONTAINER_PORT: u16 = 2368;

/// Listener rule priorities for the root and admin domains.
pub const ROOT_RULE_PRIORITY: u32 = 5;
pub const ADMIN_RULE_PRIORITY: u32 = 6;

const STICKINESS_SECONDS: u32 = 86_400;

const DATABASE_SECRET_KEYS: &[(&str, &str)] = &[
    ("database__connection__password", "password"),
    ("database__connection__host", "host"),
    ("database__connection__user", "username"),
    ("database__connection__port", "port"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOutput {
    pub service_name: String,
    pub task_definition: String,
    pub service: String,
    pub target_group_arn: String,
    pub listener_rules: Vec<String>,
}

pub struct ServiceUnit;

impl Unit for ServiceUnit {
    fn name(&self) -> &str {
        names::SERVICE
    }

    fn description(&self) -> &str {
        "Ghost container service behind the load balancer"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![
            Dependency::data(names::NETWORK),
            Dependency::data(names::CLUSTER),
            Dependency::data(names::ASSETS),
            Dependency::data(names::IAM),
            Dependency::data(names::DATABASE),
            Dependency::data(names::BALANCER),
            Dependency::data(names::DNS),
            Dependency::order(names::IMAGE),
            Dependency::order(names::CERTIFICATES),
        ]
    }

    fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
        let network = context.network(names::NETWORK)?;
        let cluster = context.cluster(names::CLUSTER)?;
        let bucket = context.bucket(names::ASSETS)?;
        let roles = context.roles(names::IAM)?;
        let database = context.database(names::DATABASE)?;
        let balancer = context.balancer(names::BALANCER)?;
        let zone = context.zone(names::DNS)?;

        let scope = context.scope();
        let settings = scope.settings();
        let service_name = scope.naming().qualify("ghostblog-service");
        let container_name = scope.naming().qualify("ghostblog-container");
        info!("Wiring service {} on cluster {}", service_name, cluster.cluster_name());

        let environment: Vec<Value> = [
            ("NODE_ENV", "production".to_string()),
            ("url", format!("https://{}", zone.zone_name())),
            ("admin__url", format!("https://{}", zone.admin_domain_name())),
            ("database__client", "mysql".to_string()),
            ("database__connection__database", settings.database_name.clone()),
            ("database__connection__ssl", "Amazon RDS".to_string()),
            ("adapters__storage__active", "s3".to_string()),
            ("GHOST_STORAGE_ADAPTER_S3_PATH_BUCKET", bucket.bucket_name().to_string()),
            ("GHOST_STORAGE_ADAPTER_S3_PATH_PREFIX", "content/images".to_string()),
        ]
        .into_iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value }))
        .collect();

        let secrets: Vec<Value> = DATABASE_SECRET_KEYS
            .iter()
            .map(|(name, key)| {
                json!({
                    "Name": name,
                    "ValueFrom": format!("{}:{}::", database.secret_arn(), key),
                })
            })
            .collect();

        // The image is built outside this run; read its URI from the
        // parameter the image unit publishes.
        let image = scope.parameter_reference(&image_uri_suffix(IMAGE_NAME));

        let task_definition = Resource::new(
            scope.logical_id("GhostBlogTaskDefinition"),
            "AWS::ECS::TaskDefinition",
        )
        .properties(json!({
            "RequiresCompatibilities": ["FARGATE"],
            "NetworkMode": "awsvpc",
            "Memory": "1024",
            "ExecutionRoleArn": roles.task_execution_role.role_arn,
            "TaskRoleArn": roles.container_role.role_arn,
            "ContainerDefinitions": [{
                "Name": container_name,
                "Image": image,
                "Memory": 1024,
                "MemoryReservation": 512,
                "PortMappings": [{ "ContainerPort": CONTAINER_PORT, "Protocol": "tcp" }],
                "Environment": environment,
                "Secrets": secrets,
                "LogConfiguration": {
                    "LogDriver": "awslogs",
                    "Options": { "awslogs-stream-prefix": settings.ecs_settings.logging_prefix },
                },
            }],
        }));
        let task_definition_arn = task_definition.attr("TaskDefinitionArn");
        let task_definition_id = scope.declare(task_definition)?;

        let health_check = &settings.health_check;
        let target_group = Resource::new(
            scope.logical_id("GhostBlogTargetGroup"),
            "AWS::ElasticLoadBalancingV2::TargetGroup",
        )
        .properties(json!({
            "TargetType": "ip",
            "VpcId": network.vpc_id(),
            "Port": CONTAINER_PORT,
            "Protocol": "HTTP",
            "ProtocolVersion": "HTTP1",
            "HealthCheckEnabled": true,
            "HealthCheckPort": CONTAINER_PORT.to_string(),
            "HealthCheckIntervalSeconds": health_check.interval_secs,
            "HealthCheckTimeoutSeconds": health_check.timeout_secs,
            "HealthyThresholdCount": health_check.healthy_threshold_count,
            "UnhealthyThresholdCount": health_check.unhealthy_threshold_count,
            "TargetGroupAttributes": [
                { "Key": "stickiness.enabled", "Value": "true" },
                { "Key": "stickiness.type", "Value": "app_cookie" },
                { "Key": "stickiness.app_cookie.cookie_name", "Value": settings.alb_settings.sticky_cookie_name },
                { "Key": "stickiness.app_cookie.duration_seconds", "Value": STICKINESS_SECONDS.to_string() },
            ],
        }));
        let target_group_arn = target_group.attr("TargetGroupArn");
        let target_group_id = scope.declare(target_group)?;

        let mut listener_rules = Vec::new();
        for (name, host, priority) in [
            ("GhostBlogRouteMapping", zone.zone_name(), ROOT_RULE_PRIORITY),
            ("GhostBlogAdminRouteMapping", zone.admin_domain_name(), ADMIN_RULE_PRIORITY),
        ] {
            let rule = Resource::new(
                scope.logical_id(name),
                "AWS::ElasticLoadBalancingV2::ListenerRule",
            )
            .properties(json!({
                "ListenerArn": balancer.listener_arn(),
                "Priority": priority,
                "Conditions": [{ "Field": "host-header", "HostHeaderConfig": { "Values": [host] } }],
                "Actions": [{ "Type": "forward", "TargetGroupArn": target_group_arn }],
            }))
            .depends_on(&target_group_id);
            listener_rules.push(scope.declare(rule)?);
        }

        let mut security_groups = cluster.security_group_ids().to_vec();
        if security_groups.is_empty() {
            security_groups.push(network.security_group_id().to_string());
        }
        let mut service = Resource::new(scope.logical_id("GhostBlogService"), "AWS::ECS::Service")
            .properties(json!({
                "ServiceName": service_name,
                "Cluster": cluster.cluster_arn(),
                "TaskDefinition": task_definition_arn,
                "LaunchType": "FARGATE",
                "DesiredCount": 1,
                "EnableECSManagedTags": true,
                "HealthCheckGracePeriodSeconds": health_check.grace_period_secs,
                "DeploymentController": { "Type": "ECS" },
                "DeploymentConfiguration": {
                    "DeploymentCircuitBreaker": { "Enable": true, "Rollback": true },
                },
                "NetworkConfiguration": {
                    "AwsvpcConfiguration": { "SecurityGroups": security_groups },
                },
                "LoadBalancers": [{
                    "ContainerName": container_name,
                    "ContainerPort": CONTAINER_PORT,
                    "TargetGroupArn": target_group_arn,
                }],
            }))
            .depends_on(&task_definition_id);
        for rule in &listener_rules {
            service = service.depends_on(rule);
        }
        let service_id = scope.declare(service)?;

        Ok(UnitOutput::Service(ServiceOutput {
            service_name,
            task_definition: task_definition_id,
            service: service_id,
            target_group_arn,
            listener_rules,
        }))
    }
}
