//! Certificates for the domains served from the hosted zone.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ConstructResult;
use crate::naming::logical_name;
use crate::route53::ZoneHandle;
use crate::scope::ConstructScope;
use crate::template::Resource;

/// Parameter suffix of the certificate issued for `domain`.
///
/// The balancer listener refers to the root domain certificate through this
/// path before it is published.
pub fn certificate_arn_suffix(domain: &str) -> String {
    format!("acm/{}/arn", domain)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCertificate {
    pub domain: String,
    pub logical_id: String,
    pub certificate_arn: String,
}

pub struct AcmConstruct;

impl AcmConstruct {
    /// Request one DNS validated certificate per domain of the zone.
    pub fn resolve(scope: &mut ConstructScope, zone: &ZoneHandle) -> ConstructResult<Vec<IssuedCertificate>> {
        let mut certificates = Vec::new();

        for domain in zone.domains() {
            info!("Requesting certificate for {}", domain);
            let certificate = Resource::new(
                scope.logical_id(&format!("{}Certificate", logical_name(&domain))),
                "AWS::CertificateManager::Certificate",
            )
            .properties(json!({
                "DomainName": domain,
                "ValidationMethod": "DNS",
                "DomainValidationOptions": [{
                    "DomainName": domain,
                    "HostedZoneId": zone.hosted_zone_id(),
                }],
            }));
            let certificate_arn = certificate.attr("Arn");
            let certificate = match zone.resource() {
                Some(zone_id) => certificate.depends_on(zone_id),
                None => certificate,
            };
            let logical_id = scope.declare(certificate)?;

            scope.publish(
                &certificate_arn_suffix(&domain),
                certificate_arn.as_str(),
                format!("{} Certificate ARN", domain),
            )?;

            certificates.push(IssuedCertificate {
                domain,
                logical_id,
                certificate_arn,
            });
        }

        Ok(certificates)
    }
}
