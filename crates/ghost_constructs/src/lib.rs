//! # ghost_constructs
//!
//! Resource resolvers for ghost-infra.
//!
//! Every resolver works against a [`ConstructScope`]: it reads the shared
//! settings snapshot, decides whether to import or provision, declares
//! provisioned resources in the [`Template`] and publishes the identifiers
//! it resolved into the [`ParameterRegistry`].
//!
//! # Resources
//!
//! - **Importable**: network ([`VpcConstruct`]), cluster ([`EcsConstruct`]),
//!   load balancer ([`AlbConstruct`])
//! - **Always provisioned**: database, asset bucket, roles, image, DNS zone,
//!   certificates
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ghost_conf::{Settings, SettingsKey};
//! use ghost_constructs::{ConstructScope, StaticLookup, VpcConstruct};
//!
//! let mut scope = ConstructScope::new(
//!     SettingsKey::new("123456789012", "eu-west-1"),
//!     Arc::new(Settings::default().with_prefix("acme")),
//!     Arc::new(StaticLookup::new()),
//! )?;
//! let network = VpcConstruct::resolve(&mut scope)?;
//!
//! assert!(!network.is_imported());
//! assert_eq!(scope.parameters().get("vpc/id").map(|e| e.path.as_str()), Some("/acme/vpc/id"));
//! # Ok::<(), ghost_constructs::ConstructError>(())
//! ```

pub mod acm;
pub mod alb;
pub mod ecs;
pub mod error;
pub mod handle;
pub mod iam;
pub mod image;
pub mod lookup;
pub mod naming;
pub mod parameter;
pub mod rds;
pub mod route53;
pub mod s3;
pub mod scope;
pub mod template;
pub mod vpc;

pub use acm::{certificate_arn_suffix, AcmConstruct, IssuedCertificate};
pub use alb::{AlbConstruct, BalancerAttributes, BalancerHandle};
pub use ecs::{ClusterAttributes, ClusterHandle, EcsConstruct};
pub use error::{ConstructError, ConstructResult};
pub use handle::{decide, Decision, Handle};
pub use iam::{IamConstruct, RoleOutput, ServiceRoles};
pub use image::{image_uri_suffix, ImageAsset, ImageConstruct, IMAGE_NAME};
pub use lookup::{ImportLookup, ResourceDescription, ResourceKind, StaticLookup};
pub use naming::Naming;
pub use parameter::{parameter_reference, path_for_prefix, ParameterEntry, ParameterRegistry, ParameterTier};
pub use rds::{DatabaseAttributes, DatabaseHandle, RdsConstruct};
pub use route53::{HostedZoneAttributes, Route53Construct, ZoneHandle};
pub use s3::{BucketAttributes, BucketHandle, S3Construct};
pub use scope::{ConstructScope, PROJECT_TAG};
pub use template::{Resource, StackOutput, Template};
pub use vpc::{NetworkAttributes, NetworkHandle, VpcConstruct};
