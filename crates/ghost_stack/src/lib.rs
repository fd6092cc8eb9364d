//! # ghost_stack
//!
//! Composition of the ghost blog stack.
//!
//! The stack is a [`CompositionGraph`] of named [`Unit`]s. Each unit declares
//! what it depends on, either for a value ([`Dependency::Data`]) or only for
//! ordering ([`Dependency::Order`]). The graph is linearized before anything
//! runs, then each unit is constructed once against a shared
//! `ConstructScope`, seeing only the outputs of its data dependencies.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ghost_conf::{ConfigurationRegistry, SettingsKey};
//! use ghost_constructs::StaticLookup;
//! use ghost_stack::{ghost_blog_graph, Synthesizer};
//!
//! let registry = ConfigurationRegistry::with_defaults();
//! let graph = ghost_blog_graph()?;
//! let synthesis = Synthesizer::new(&registry, Arc::new(StaticLookup::new()))
//!     .synthesize(&graph, &SettingsKey::new("123456789012", "eu-west-1"))?;
//!
//! assert_eq!(synthesis.order.first().map(String::as_str), Some("network"));
//! # Ok::<(), ghost_stack::StackError>(())
//! ```

pub mod error;
pub mod graph;
pub mod service;
pub mod synthesis;
pub mod unit;
pub mod units;

pub use error::{StackError, StackResult};
pub use graph::{Composition, CompositionGraph};
pub use service::{ServiceOutput, ServiceUnit};
pub use synthesis::{Synthesis, Synthesizer};
pub use unit::{Dependency, Unit, UnitContext, UnitOutput};
pub use units::{ghost_blog_graph, names};
