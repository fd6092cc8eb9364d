//! Settings review.
//!
//! Import settings take precedence over the provisioning fields of the same
//! resource. Those fields are not an error, they are just dead data. The
//! review lists provisioning fields that were changed from their defaults
//! while the resource is imported, so an operator can be warned about them.

use serde::Serialize;

use crate::settings::{AlbSettings, Settings, VpcSettings};

/// Provisioning fields ignored because the resource is imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationConflict {
    /// Settings section of the imported resource.
    pub resource: &'static str,
    /// Fields in that section that will not be used.
    pub ignored_fields: Vec<&'static str>,
}

impl std::fmt::Display for ConfigurationConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is imported; ignoring {}",
            self.resource,
            self.ignored_fields.join(", ")
        )
    }
}

/// List every conflict between import settings and provisioning fields.
pub fn review(settings: &Settings) -> Vec<ConfigurationConflict> {
    let mut conflicts = Vec::new();

    if settings.vpc_settings.import_settings.is_some() {
        let defaults = VpcSettings::default();
        let vpc = &settings.vpc_settings;
        let mut ignored = Vec::new();
        if vpc.vpc_cidr_range != defaults.vpc_cidr_range {
            ignored.push("vpc_cidr_range");
        }
        if vpc.number_of_nat_gateways != defaults.number_of_nat_gateways {
            ignored.push("number_of_nat_gateways");
        }
        if vpc.enable_service_endpoints != defaults.enable_service_endpoints {
            ignored.push("enable_service_endpoints");
        }
        push_conflict(&mut conflicts, "vpc_settings", ignored);
    }

    // The logging prefix belongs to the container, so an imported cluster
    // leaves nothing unused.

    if settings.alb_settings.import_settings.is_some() {
        let defaults = AlbSettings::default();
        let mut ignored = Vec::new();
        if settings.alb_settings.ssl_policy != defaults.ssl_policy {
            ignored.push("ssl_policy");
        }
        push_conflict(&mut conflicts, "alb_settings", ignored);
    }

    conflicts
}

fn push_conflict(
    conflicts: &mut Vec<ConfigurationConflict>,
    resource: &'static str,
    ignored_fields: Vec<&'static str>,
) {
    if !ignored_fields.is_empty() {
        conflicts.push(ConfigurationConflict {
            resource,
            ignored_fields,
        });
    }
}
