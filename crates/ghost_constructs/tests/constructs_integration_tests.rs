//! Integration tests for the resource resolvers.

use std::fs;
use std::sync::Arc;

use ghost_conf::{
    AlbImportSettings, ClusterImportSettings, ConfigurationRegistry, LayeredSource, Settings,
    SettingsKey, VpcImportSettings,
};
use ghost_constructs::lookup::attributes;
use ghost_constructs::{
    path_for_prefix, AlbConstruct, ConstructError, ConstructScope, EcsConstruct, ResourceDescription,
    ResourceKind, StaticLookup, VpcConstruct,
};
use tempfile::tempdir;

fn scope(settings: Settings, lookup: StaticLookup) -> ConstructScope {
    ConstructScope::new(
        SettingsKey::new("111111111111", "eu-west-1"),
        Arc::new(settings),
        Arc::new(lookup),
    )
    .unwrap()
}

fn known_resources() -> StaticLookup {
    StaticLookup::new()
        .with(
            ResourceDescription::new(ResourceKind::Vpc, "vpc-1")
                .with_attribute(attributes::CIDR_BLOCK, "10.9.0.0/16"),
        )
        .with(
            ResourceDescription::new(ResourceKind::LoadBalancer, "arn:alb")
                .with_attribute(attributes::DNS_NAME, "alb-1.elb.amazonaws.com")
                .with_attribute(attributes::CANONICAL_HOSTED_ZONE_ID, "Z1"),
        )
}

#[test]
fn test_staging_cluster_import_scenario() {
    let settings = Settings::default()
        .with_prefix("stg")
        .with_cluster_import(ClusterImportSettings {
            cluster_name: "x".to_string(),
            cluster_arn: "arn:aws:ecs:x".to_string(),
            vpc_id: "vpc-1".to_string(),
            security_group_ids: vec!["sg-1".to_string()],
        });
    let mut scope = scope(settings, StaticLookup::new());

    let network = VpcConstruct::resolve(&mut scope).unwrap();
    let cluster = EcsConstruct::resolve(&mut scope, &network).unwrap();

    assert!(!network.is_imported());
    assert!(cluster.is_imported());
    assert_eq!(cluster.cluster_name(), "x");
    assert_eq!(cluster.cluster_arn(), "arn:aws:ecs:x");
    assert_eq!(cluster.vpc_id(), "vpc-1");
    assert_eq!(cluster.security_group_ids().to_vec(), vec!["sg-1".to_string()]);

    let entries = scope.parameters().entries();
    let arn = entries.iter().find(|e| e.path == "/stg/ecs/cluster/arn").unwrap();
    let name = entries.iter().find(|e| e.path == "/stg/ecs/cluster/name").unwrap();
    assert_eq!(arn.value, "arn:aws:ecs:x");
    assert_eq!(name.value, "x");
    assert!(scope.template().of_type("AWS::ECS::Cluster").next().is_none());
}

#[test]
fn test_imports_declare_nothing() {
    let settings = Settings::default()
        .with_vpc_import(VpcImportSettings {
            vpc_id: "vpc-1".to_string(),
            security_group_id: "sg-1".to_string(),
        })
        .with_alb_import(AlbImportSettings {
            load_balancer_arn: "arn:alb".to_string(),
            listener_arn: "arn:listener".to_string(),
            security_group_id: Some("sg-alb".to_string()),
        });
    let mut scope = scope(settings, known_resources());

    let network = VpcConstruct::resolve(&mut scope).unwrap();
    let balancer = AlbConstruct::resolve(&mut scope, &network).unwrap();

    assert_eq!(network.vpc_id(), "vpc-1");
    assert_eq!(network.security_group_id(), "sg-1");
    assert_eq!(balancer.listener_arn(), "arn:listener");
    assert_eq!(balancer.security_group_id(), Some("sg-alb"));
    assert!(scope.template().is_empty());
    assert_eq!(scope.parameters().len(), 7);
}

#[test]
fn test_endpoints_follow_flag() {
    for enabled in [true, false] {
        let mut scope = scope(
            Settings::default().with_service_endpoints(enabled),
            StaticLookup::new(),
        );
        let network = VpcConstruct::resolve(&mut scope).unwrap();

        let endpoints = scope.template().of_type("AWS::EC2::VPCEndpoint").count();
        assert_eq!(endpoints > 0, enabled);
        assert!(!network.is_imported());
        assert_eq!(
            scope.template().of_type("AWS::EC2::SecurityGroup").count(),
            1
        );
    }
}

#[test]
fn test_path_for_prefix_cases() {
    assert_eq!(path_for_prefix("acme", "vpc/id"), "/acme/vpc/id");
    assert_eq!(path_for_prefix("", "vpc/id"), "/vpc/id");
}

#[test]
fn test_same_resolver_twice_collides() {
    let mut scope = scope(Settings::default(), StaticLookup::new());
    let network = VpcConstruct::resolve(&mut scope).unwrap();
    EcsConstruct::resolve(&mut scope, &network).unwrap();

    let err = scope.publish("ecs/cluster/arn", "other", "again").unwrap_err();
    assert!(matches!(err, ConstructError::DuplicatePath(p) if p == "/ecs/cluster/arn"));
}

#[test]
fn test_settings_file_drives_imports() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("ghost.yaml");
    fs::write(
        &config,
        r#"
settings:
  prefix_name: acme
targets:
  111111111111-eu-west-1:
    vpc_settings:
      import_settings:
        vpc_id: vpc-1
        security_group_id: sg-1
"#,
    )
    .unwrap();

    let registry = ConfigurationRegistry::new(LayeredSource::from_file(&config).unwrap());
    let settings = registry.resolve("111111111111", "eu-west-1");
    let mut scope = ConstructScope::new(
        SettingsKey::new("111111111111", "eu-west-1"),
        settings,
        Arc::new(known_resources()),
    )
    .unwrap();

    let network = VpcConstruct::resolve(&mut scope).unwrap();
    assert_eq!(network.cidr_block(), "10.9.0.0/16");
    assert_eq!(scope.parameters().value("vpc/cidr"), Some("10.9.0.0/16"));
    assert_eq!(
        scope.parameters().get("vpc/cidr").unwrap().path,
        "/acme/vpc/cidr"
    );
}
