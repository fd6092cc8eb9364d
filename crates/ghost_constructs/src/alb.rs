//! Load balancer resolver.

use ghost_conf::{validate_domain_name, AlbImportSettings, AlbSettings};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::acm::certificate_arn_suffix;
use crate::error::ConstructResult;
use crate::handle::{decide, Decision, Handle};
use crate::lookup::{attributes, ResourceKind};
use crate::scope::ConstructScope;
use crate::template::Resource;
use crate::vpc::NetworkHandle;

pub const ALB_ARN: &str = "alb/arn";
pub const LISTENER_ARN: &str = "ecs/alb/ssllistener/arn";
pub const DNS_NAME: &str = "ecs/alb/ssllistener/dnsName";
pub const CANONICAL_HOSTED_ZONE_ID: &str = "ecs/alb/ssllistener/canonicalHostedZoneId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancerAttributes {
    pub load_balancer_arn: String,
    /// HTTPS listener the application routes are attached to.
    pub listener_arn: String,
    pub dns_name: String,
    pub canonical_hosted_zone_id: String,
    pub security_group_id: Option<String>,
}

pub type BalancerHandle = Handle<BalancerAttributes>;

impl Handle<BalancerAttributes> {
    pub fn load_balancer_arn(&self) -> &str {
        &self.attributes().load_balancer_arn
    }

    pub fn listener_arn(&self) -> &str {
        &self.attributes().listener_arn
    }

    pub fn dns_name(&self) -> &str {
        &self.attributes().dns_name
    }

    pub fn canonical_hosted_zone_id(&self) -> &str {
        &self.attributes().canonical_hosted_zone_id
    }

    pub fn security_group_id(&self) -> Option<&str> {
        self.attributes().security_group_id.as_deref()
    }
}

/// Imports the configured application load balancer or provisions an
/// internet facing one with an HTTPS listener and an HTTP redirect.
pub struct AlbConstruct;

impl AlbConstruct {
    pub fn resolve(scope: &mut ConstructScope, network: &NetworkHandle) -> ConstructResult<BalancerHandle> {
        let settings = scope.settings();
        let balancer = match decide(settings.alb_settings.import_settings.as_ref()) {
            Decision::Import(import) => Self::import(scope, import)?,
            Decision::Provision => {
                Self::provision(scope, network, &settings.alb_settings, &settings.domain_name)?
            }
        };

        scope.publish(ALB_ARN, balancer.load_balancer_arn(), "ApplicationLoadBalancer ARN")?;
        scope.publish(
            LISTENER_ARN,
            balancer.listener_arn(),
            "ApplicationLoadBalancer Default SSL Listener ARN",
        )?;
        scope.publish(DNS_NAME, balancer.dns_name(), "ApplicationLoadBalancer DNS Name")?;
        scope.publish(
            CANONICAL_HOSTED_ZONE_ID,
            balancer.canonical_hosted_zone_id(),
            "ApplicationLoadBalancer Canonical Hosted Zone ID",
        )?;

        Ok(balancer)
    }

    fn import(scope: &ConstructScope, import: &AlbImportSettings) -> ConstructResult<BalancerHandle> {
        info!("Importing load balancer {}", import.load_balancer_arn);
        let description = scope.lookup(ResourceKind::LoadBalancer, &import.load_balancer_arn)?;

        Ok(Handle::imported(BalancerAttributes {
            load_balancer_arn: import.load_balancer_arn.clone(),
            listener_arn: import.listener_arn.clone(),
            dns_name: description.require(attributes::DNS_NAME)?.to_string(),
            canonical_hosted_zone_id: description
                .require(attributes::CANONICAL_HOSTED_ZONE_ID)?
                .to_string(),
            security_group_id: import.security_group_id.clone(),
        }))
    }

    fn provision(
        scope: &mut ConstructScope,
        network: &NetworkHandle,
        alb: &AlbSettings,
        domain_name: &str,
    ) -> ConstructResult<BalancerHandle> {
        validate_domain_name(domain_name)?;
        let name = scope.naming().qualify("ghostblog-alb");
        info!("Provisioning load balancer {}", name);

        let balancer = Resource::new(
            scope.logical_id("ApplicationLoadBalancer"),
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
        )
        .properties(json!({
            "Name": name,
            "Scheme": "internet-facing",
            "Type": "application",
            "VpcId": network.vpc_id(),
            "SecurityGroups": [network.security_group_id()],
            "LoadBalancerAttributes": [
                { "Key": "routing.http.preserve_host_header.enabled", "Value": "true" },
                { "Key": "routing.http.xff_client_port.enabled", "Value": "true" },
            ],
        }));
        let attributes = BalancerAttributes {
            load_balancer_arn: balancer.attr("LoadBalancerArn"),
            listener_arn: String::new(),
            dns_name: balancer.attr("DNSName"),
            canonical_hosted_zone_id: balancer.attr("CanonicalHostedZoneID"),
            security_group_id: Some(network.security_group_id().to_string()),
        };
        let balancer_id = scope.declare(balancer)?;

        let target_group = Resource::new(
            scope.logical_id("DefaultApplicationTargetGroup"),
            "AWS::ElasticLoadBalancingV2::TargetGroup",
        )
        .properties(json!({
            "TargetType": "ip",
            "Protocol": "HTTP",
            "ProtocolVersion": "HTTP1",
            "Port": 80,
            "VpcId": network.vpc_id(),
        }));
        let target_group_arn = target_group.attr("TargetGroupArn");
        let target_group_id = scope.declare(target_group)?;

        // The certificate is issued later in the run; refer to it through the
        // parameter it will be published under.
        let certificate = scope.parameter_reference(&certificate_arn_suffix(domain_name));
        let listener = Resource::new(
            scope.logical_id("DefaultSecureApplicationListener"),
            "AWS::ElasticLoadBalancingV2::Listener",
        )
        .properties(json!({
            "LoadBalancerArn": attributes.load_balancer_arn,
            "Port": 443,
            "Protocol": "HTTPS",
            "SslPolicy": alb.ssl_policy.policy_name(),
            "Certificates": [{ "CertificateArn": certificate }],
            "DefaultActions": [{ "Type": "forward", "TargetGroupArn": target_group_arn }],
        }))
        .depends_on(&balancer_id)
        .depends_on(&target_group_id);
        let listener_arn = listener.attr("ListenerArn");
        let listener_id = scope.declare(listener)?;

        let redirect = Resource::new(
            scope.logical_id("RedirectApplicationListener"),
            "AWS::ElasticLoadBalancingV2::Listener",
        )
        .properties(json!({
            "LoadBalancerArn": attributes.load_balancer_arn,
            "Port": 80,
            "Protocol": "HTTP",
            "DefaultActions": [{
                "Type": "redirect",
                "RedirectConfig": { "Protocol": "HTTPS", "Port": "443", "StatusCode": "HTTP_301" },
            }],
        }))
        .depends_on(&balancer_id);
        let redirect_id = scope.declare(redirect)?;

        Ok(Handle::provisioned(
            balancer_id,
            vec![target_group_id, listener_id, redirect_id],
            BalancerAttributes {
                listener_arn,
                ..attributes
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ghost_conf::{Settings, SettingsKey};

    use crate::error::ConstructError;
    use crate::lookup::{MockImportLookup, ResourceDescription};
    use crate::vpc::NetworkAttributes;

    fn network() -> NetworkHandle {
        Handle::imported(NetworkAttributes {
            vpc_id: "vpc-1".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            security_group_id: "sg-1".to_string(),
        })
    }

    fn import() -> AlbImportSettings {
        AlbImportSettings {
            load_balancer_arn: "arn:aws:elasticloadbalancing:alb".to_string(),
            listener_arn: "arn:aws:elasticloadbalancing:listener".to_string(),
            security_group_id: None,
        }
    }

    fn scope_with(settings: Settings, lookup: MockImportLookup) -> ConstructScope {
        ConstructScope::new(
            SettingsKey::new("111111111111", "eu-west-1"),
            Arc::new(settings),
            Arc::new(lookup),
        )
        .unwrap()
    }

    #[test]
    fn test_provision_declares_listeners() {
        let mut lookup = MockImportLookup::new();
        lookup.expect_lookup().times(0);
        let settings = Settings::default().with_prefix("stg").with_domain("example.com");
        let mut scope = scope_with(settings, lookup);

        let balancer = AlbConstruct::resolve(&mut scope, &network()).unwrap();

        assert_eq!(balancer.children().len(), 3);
        assert_eq!(balancer.listener_arn(), "${stg-DefaultSecureApplicationListener.ListenerArn}");
        assert_eq!(balancer.security_group_id(), Some("sg-1"));

        let listener = scope.template().get("stg-DefaultSecureApplicationListener").unwrap();
        assert_eq!(listener.properties["SslPolicy"], json!("ELBSecurityPolicy-2016-08"));
        assert_eq!(
            listener.properties["Certificates"][0]["CertificateArn"],
            json!("{{resolve:ssm:/stg/acm/example.com/arn}}")
        );

        let redirect = scope.template().get("stg-RedirectApplicationListener").unwrap();
        assert_eq!(redirect.properties["Port"], json!(80));
        assert_eq!(
            redirect.properties["DefaultActions"][0]["RedirectConfig"]["Protocol"],
            json!("HTTPS")
        );

        assert_eq!(
            scope.parameters().get(DNS_NAME).unwrap().path,
            "/stg/ecs/alb/ssllistener/dnsName"
        );
    }

    #[test]
    fn test_import_skips_listeners() {
        let mut lookup = MockImportLookup::new();
        lookup
            .expect_lookup()
            .withf(|kind, id| {
                *kind == ResourceKind::LoadBalancer && id == "arn:aws:elasticloadbalancing:alb"
            })
            .times(1)
            .returning(|kind, id| {
                Ok(ResourceDescription::new(kind, id)
                    .with_attribute(attributes::DNS_NAME, "alb-1.eu-west-1.elb.amazonaws.com")
                    .with_attribute(attributes::CANONICAL_HOSTED_ZONE_ID, "Z32O12XQLNTSW2"))
            });
        let mut scope = scope_with(Settings::default().with_alb_import(import()), lookup);

        let balancer = AlbConstruct::resolve(&mut scope, &network()).unwrap();

        assert!(balancer.is_imported());
        assert_eq!(balancer.load_balancer_arn(), "arn:aws:elasticloadbalancing:alb");
        assert_eq!(balancer.listener_arn(), "arn:aws:elasticloadbalancing:listener");
        assert_eq!(balancer.dns_name(), "alb-1.eu-west-1.elb.amazonaws.com");
        assert_eq!(balancer.security_group_id(), None);
        assert!(scope.template().is_empty());
        assert_eq!(scope.parameters().len(), 4);
    }

    #[test]
    fn test_import_incomplete_description() {
        let mut lookup = MockImportLookup::new();
        lookup
            .expect_lookup()
            .returning(|kind, id| Ok(ResourceDescription::new(kind, id)));
        let mut scope = scope_with(Settings::default().with_alb_import(import()), lookup);

        let err = AlbConstruct::resolve(&mut scope, &network()).unwrap_err();
        assert!(matches!(err, ConstructError::ImportLookupIncomplete { .. }));
    }
}
