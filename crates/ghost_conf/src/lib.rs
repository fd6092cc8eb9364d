//! # ghost_conf
//!
//! Settings model and configuration resolution for ghost-infra.
//!
//! One [`Settings`] snapshot exists per `(account, region)` pair. The
//! [`ConfigurationRegistry`] builds it lazily from a [`SettingsSource`]
//! (built-in defaults, optionally layered with YAML overrides) and hands out
//! the same shared instance for every later request with the same key.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ghost_conf::ConfigurationRegistry;
//!
//! let registry = ConfigurationRegistry::with_defaults();
//! let a = registry.resolve("123456789012", "eu-west-1");
//! let b = registry.resolve("123456789012", "eu-west-1");
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

pub mod error;
pub mod registry;
pub mod review;
pub mod settings;
pub mod source;

pub use error::{ConfError, ConfResult};
pub use registry::{ConfigurationRegistry, SettingsKey};
pub use review::{review, ConfigurationConflict};
pub use settings::{
    parse_ipv4_cidr, AlbImportSettings, AlbSettings, ClusterImportSettings, EcsSettings,
    HealthCheckSettings, Settings, SslPolicy, VpcImportSettings, VpcSettings,
    validate_domain_name,
};
pub use source::{Defaults, LayeredSource, SettingsSource};
