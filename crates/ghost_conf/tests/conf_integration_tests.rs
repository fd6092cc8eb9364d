//! Integration tests for settings resolution.

use std::fs;
use std::sync::Arc;

use ghost_conf::{ConfError, ConfigurationRegistry, LayeredSource, Settings};
use tempfile::tempdir;

const OVERRIDES: &str = r#"
settings:
  domain_name: blog.example.com
  vpc_settings:
    number_of_nat_gateways: 2

targets:
  111111111111-eu-west-1:
    prefix_name: stg
    ecs_settings:
      import_settings:
        cluster_name: x
        cluster_arn: "arn:aws:ecs:x"
        vpc_id: vpc-1
        security_group_ids: [sg-1]
"#;

#[test]
fn test_registry_identity_per_key() {
    let registry = ConfigurationRegistry::with_defaults();

    let first = registry.resolve("111111111111", "eu-west-1");
    let again = registry.resolve("111111111111", "eu-west-1");
    let other_region = registry.resolve("111111111111", "us-east-1");
    let other_account = registry.resolve("222222222222", "eu-west-1");

    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &other_region));
    assert!(!Arc::ptr_eq(&first, &other_account));
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_layered_file_applies_shared_and_target_layers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.yaml");
    fs::write(&path, OVERRIDES).unwrap();

    let source = LayeredSource::from_file(&path).unwrap();
    assert_eq!(source.targets(), vec!["111111111111-eu-west-1"]);

    let registry = ConfigurationRegistry::new(source);

    let staging = registry.resolve("111111111111", "eu-west-1");
    assert_eq!(staging.prefix_name, "stg");
    assert_eq!(staging.domain_name, "blog.example.com");
    assert_eq!(staging.vpc_settings.number_of_nat_gateways, 2);
    let import = staging.ecs_settings.import_settings.as_ref().unwrap();
    assert_eq!(import.cluster_name, "x");
    assert_eq!(import.security_group_ids, vec!["sg-1".to_string()]);

    let shared = registry.resolve("111111111111", "us-east-1");
    assert_eq!(shared.prefix_name, "");
    assert_eq!(shared.domain_name, "blog.example.com");
    assert!(shared.ecs_settings.import_settings.is_none());
    assert_eq!(shared.health_check, Settings::default().health_check);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = LayeredSource::from_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(ConfError::Io(_))));
}

#[test]
fn test_unknown_section_rejected() {
    let result = LayeredSource::from_yaml("defaults:\n  prefix_name: x\n");
    assert!(matches!(result, Err(ConfError::Yaml(_))));
}

#[test]
fn test_targets_with_dashes_stay_distinct() {
    let source = LayeredSource::from_yaml("targets:\n  a-b-c:\n    prefix_name: stg\n").unwrap();
    let registry = ConfigurationRegistry::new(source);

    assert_eq!(registry.resolve("a", "b-c").prefix_name, "stg");
    assert_eq!(registry.resolve("a-b", "c").prefix_name, "");
    assert_eq!(registry.len(), 2);
}
