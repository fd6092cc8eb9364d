//! Settings model.
//!
//! Every importable resource (VPC, ECS cluster, load balancer) carries an
//! optional `import_settings` record. When it is present the resource is
//! referenced instead of created, and the remaining provisioning fields of
//! that resource are ignored. They are never rejected; see [`crate::review`].

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfError, ConfResult};

/// Resolved settings for one `(account, region)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Namespace token applied to derived names and parameter paths.
    pub prefix_name: String,
    /// Public domain the application is served from.
    pub domain_name: String,
    /// Database schema name used by the application.
    pub database_name: String,
    pub health_check: HealthCheckSettings,
    pub vpc_settings: VpcSettings,
    pub ecs_settings: EcsSettings,
    pub alb_settings: AlbSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix_name: String::new(),
            domain_name: "localhost".to_string(),
            database_name: "ghost_blog".to_string(),
            health_check: HealthCheckSettings::default(),
            vpc_settings: VpcSettings::default(),
            ecs_settings: EcsSettings::default(),
            alb_settings: AlbSettings::default(),
        }
    }
}

impl Settings {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_name = prefix.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_name = domain.into();
        self
    }

    pub fn with_vpc_import(mut self, import: VpcImportSettings) -> Self {
        self.vpc_settings.import_settings = Some(import);
        self
    }

    pub fn with_cluster_import(mut self, import: ClusterImportSettings) -> Self {
        self.ecs_settings.import_settings = Some(import);
        self
    }

    pub fn with_alb_import(mut self, import: AlbImportSettings) -> Self {
        self.alb_settings.import_settings = Some(import);
        self
    }

    pub fn with_service_endpoints(mut self, enabled: bool) -> Self {
        self.vpc_settings.enable_service_endpoints = enabled;
        self
    }
}

/// Target group and service health check tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthCheckSettings {
    pub interval_secs: u64,
    pub healthy_threshold_count: u32,
    pub unhealthy_threshold_count: u32,
    pub timeout_secs: u64,
    pub grace_period_secs: u64,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            healthy_threshold_count: 5,
            unhealthy_threshold_count: 5,
            timeout_secs: 45,
            grace_period_secs: 900,
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VpcSettings {
    pub vpc_cidr_range: String,
    pub number_of_nat_gateways: u32,
    /// Gates the S3 gateway endpoint and the ECR, Secrets Manager and
    /// CloudWatch Logs interface endpoints.
    pub enable_service_endpoints: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_settings: Option<VpcImportSettings>,
}

impl Default for VpcSettings {
    fn default() -> Self {
        Self {
            vpc_cidr_range: "20.0.0.0/16".to_string(),
            number_of_nat_gateways: 1,
            enable_service_endpoints: true,
            import_settings: None,
        }
    }
}

/// Identifiers of an existing VPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VpcImportSettings {
    pub vpc_id: String,
    pub security_group_id: String,
}

/// Container cluster settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsSettings {
    /// Log stream prefix of the application container.
    pub logging_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_settings: Option<ClusterImportSettings>,
}

impl Default for EcsSettings {
    fn default() -> Self {
        Self {
            logging_prefix: "ghostblog-container".to_string(),
            import_settings: None,
        }
    }
}

/// Identifiers of an existing ECS cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterImportSettings {
    pub cluster_name: String,
    pub cluster_arn: String,
    pub vpc_id: String,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

/// Load balancer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlbSettings {
    pub ssl_policy: SslPolicy,
    pub sticky_cookie_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_settings: Option<AlbImportSettings>,
}

impl Default for AlbSettings {
    fn default() -> Self {
        Self {
            ssl_policy: SslPolicy::default(),
            sticky_cookie_name: "ghostblog-sticky-cookie".to_string(),
            import_settings: None,
        }
    }
}

/// Identifiers of an existing application load balancer.
///
/// The HTTPS listener is owned by whoever owns the balancer, so its ARN has
/// to be supplied alongside the balancer ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbImportSettings {
    pub load_balancer_arn: String,
    pub listener_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
}

/// TLS negotiation policy of the HTTPS listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslPolicy {
    #[default]
    Recommended,
    RecommendedTls,
    Tls13,
    Tls12,
}

impl SslPolicy {
    /// Name of the listener security policy.
    pub fn policy_name(&self) -> &'static str {
        match self {
            SslPolicy::Recommended => "ELBSecurityPolicy-2016-08",
            SslPolicy::RecommendedTls => "ELBSecurityPolicy-TLS13-1-2-2021-06",
            SslPolicy::Tls13 => "ELBSecurityPolicy-TLS13-1-3-2021-06",
            SslPolicy::Tls12 => "ELBSecurityPolicy-TLS-1-2-2017-01",
        }
    }
}

impl std::fmt::Display for SslPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.policy_name())
    }
}

/// Parse an IPv4 CIDR range such as `20.0.0.0/16`.
pub fn parse_ipv4_cidr(range: &str) -> ConfResult<(Ipv4Addr, u8)> {
    let invalid = |message: &str| ConfError::InvalidValue {
        field: "vpc_cidr_range".to_string(),
        message: format!("'{}' {}", range, message),
    };

    let (addr, len) = range
        .split_once('/')
        .ok_or_else(|| invalid("is missing a prefix length"))?;
    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| invalid("has an invalid network address"))?;
    let len: u8 = len
        .parse()
        .map_err(|_| invalid("has an invalid prefix length"))?;

    if !(16..=28).contains(&len) {
        return Err(invalid("must use a prefix length between /16 and /28"));
    }

    let mask = u32::MAX << (32 - u32::from(len));
    if u32::from(addr) & !mask != 0 {
        return Err(invalid("has host bits set"));
    }

    Ok((addr, len))
}

/// Check a DNS domain name such as `blog.example.com`.
///
/// The name ends up in parameter paths and logical ids, so only letters,
/// digits, `-` and non-empty `.`-separated labels are accepted.
pub fn validate_domain_name(domain: &str) -> ConfResult<&str> {
    let invalid = |message: &str| ConfError::InvalidValue {
        field: "domain_name".to_string(),
        message: format!("'{}' {}", domain, message),
    };

    if domain.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if domain.len() > 253 {
        return Err(invalid("is longer than 253 characters"));
    }
    for label in domain.split('.') {
        if label.is_empty() {
            return Err(invalid("has an empty label"));
        }
        if label.len() > 63 {
            return Err(invalid("has a label longer than 63 characters"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid("may only contain letters, digits, '-' and '.'"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("has a label starting or ending with '-'"));
        }
    }

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.prefix_name, "");
        assert_eq!(settings.domain_name, "localhost");
        assert_eq!(settings.vpc_settings.vpc_cidr_range, "20.0.0.0/16");
        assert_eq!(settings.vpc_settings.number_of_nat_gateways, 1);
        assert!(settings.vpc_settings.enable_service_endpoints);
        assert!(settings.ecs_settings.import_settings.is_none());
        assert_eq!(settings.alb_settings.ssl_policy, SslPolicy::Recommended);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
prefix_name: stg
vpc_settings:
  number_of_nat_gateways: 2
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.prefix_name, "stg");
        assert_eq!(settings.vpc_settings.number_of_nat_gateways, 2);
        assert_eq!(settings.vpc_settings.vpc_cidr_range, "20.0.0.0/16");
        assert_eq!(settings.health_check.timeout_secs, 45);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "vpc_settings:\n  nat_gateways: 2\n";
        assert!(serde_yaml::from_str::<Settings>(yaml).is_err());
    }

    #[test]
    fn test_parse_cidr() {
        let (addr, len) = parse_ipv4_cidr("20.0.0.0/16").unwrap();
        assert_eq!(addr, Ipv4Addr::new(20, 0, 0, 0));
        assert_eq!(len, 16);

        assert!(parse_ipv4_cidr("20.0.0.0").is_err());
        assert!(parse_ipv4_cidr("300.0.0.0/16").is_err());
        assert!(parse_ipv4_cidr("20.0.0.1/16").is_err());
        assert!(parse_ipv4_cidr("10.0.0.0/8").is_err());
    }

    #[test]
    fn test_validate_domain_name() {
        assert_eq!(validate_domain_name("blog.example.com").unwrap(), "blog.example.com");
        assert!(validate_domain_name("localhost").is_ok());
        assert!(validate_domain_name("my-blog.io").is_ok());

        for bad in ["", "a/b", ".example.com", "example.com.", "a..b", "-a.com", "a b.com"] {
            let err = validate_domain_name(bad).unwrap_err();
            assert!(
                matches!(err, ConfError::InvalidValue { ref field, .. } if field == "domain_name"),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_ssl_policy_names() {
        assert_eq!(SslPolicy::Recommended.policy_name(), "ELBSecurityPolicy-2016-08");
        let policy: SslPolicy = serde_yaml::from_str("tls13").unwrap();
        assert_eq!(policy, SslPolicy::Tls13);
    }
}
