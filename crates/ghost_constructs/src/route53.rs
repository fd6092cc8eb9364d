//! Public DNS for the blog and its admin domain.

use ghost_conf::validate_domain_name;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::alb::BalancerHandle;
use crate::error::ConstructResult;
use crate::handle::Handle;
use crate::naming::logical_name;
use crate::scope::ConstructScope;
use crate::template::Resource;

pub fn zone_id_suffix(zone_name: &str) -> String {
    format!("route53/{}/id", zone_name)
}

pub fn zone_arn_suffix(zone_name: &str) -> String {
    format!("route53/{}/arn", zone_name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedZoneAttributes {
    pub zone_name: String,
    pub hosted_zone_id: String,
    pub hosted_zone_arn: String,
    pub admin_domain_name: String,
}

pub type ZoneHandle = Handle<HostedZoneAttributes>;

impl Handle<HostedZoneAttributes> {
    pub fn zone_name(&self) -> &str {
        &self.attributes().zone_name
    }

    pub fn hosted_zone_id(&self) -> &str {
        &self.attributes().hosted_zone_id
    }

    pub fn hosted_zone_arn(&self) -> &str {
        &self.attributes().hosted_zone_arn
    }

    pub fn admin_domain_name(&self) -> &str {
        &self.attributes().admin_domain_name
    }

    /// Domains served from the zone; each gets a certificate.
    pub fn domains(&self) -> Vec<String> {
        vec![self.zone_name().to_string(), self.admin_domain_name().to_string()]
    }
}

/// Provisions the public hosted zone for `domain_name`, with the root and
/// `admin` names aliased to the load balancer and `www` CNAMEs for both.
pub struct Route53Construct;

impl Route53Construct {
    pub fn resolve(scope: &mut ConstructScope, balancer: &BalancerHandle) -> ConstructResult<ZoneHandle> {
        let zone_name = validate_domain_name(&scope.settings().domain_name)?.to_string();
        let admin_domain_name = format!("admin.{}", zone_name);
        info!("Provisioning hosted zone {}", zone_name);

        let zone = Resource::new(scope.logical_id("PublicHostedZone"), "AWS::Route53::HostedZone")
            .property("Name", zone_name.as_str());
        let hosted_zone_id = zone.attr("Id");
        let zone_id = scope.declare(zone)?;

        let alias = json!({
            "DNSName": balancer.dns_name(),
            "HostedZoneId": balancer.canonical_hosted_zone_id(),
        });
        let records = [
            (zone_name.clone(), "A", None),
            (format!("www.{}", zone_name), "CNAME", Some(zone_name.clone())),
            (admin_domain_name.clone(), "A", None),
            (
                format!("www.{}", admin_domain_name),
                "CNAME",
                Some(admin_domain_name.clone()),
            ),
        ];

        let mut children = Vec::new();
        for (name, record_type, target) in records {
            let mut record = Resource::new(
                scope.logical_id(&format!("{}Record", logical_name(&name))),
                "AWS::Route53::RecordSet",
            )
            .properties(json!({
                "HostedZoneId": hosted_zone_id,
                "Name": name,
                "Type": record_type,
            }))
            .depends_on(&zone_id);
            record = match target {
                Some(target) => record.properties(json!({ "ResourceRecords": [target], "TTL": "1800" })),
                None => record.property("AliasTarget", alias.clone()),
            };
            children.push(scope.declare(record)?);
        }

        let zone = Handle::provisioned(
            zone_id,
            children,
            HostedZoneAttributes {
                hosted_zone_arn: format!("arn:aws:route53:::hostedzone/{}", hosted_zone_id),
                zone_name,
                hosted_zone_id,
                admin_domain_name,
            },
        );

        scope.publish(
            &zone_id_suffix(zone.zone_name()),
            zone.hosted_zone_id(),
            format!("{} ID", zone.zone_name()),
        )?;
        scope.publish(
            &zone_arn_suffix(zone.zone_name()),
            zone.hosted_zone_arn(),
            format!("{} ARN", zone.zone_name()),
        )?;

        Ok(zone)
    }
}
