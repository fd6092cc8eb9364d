//! Synthesis of one composition run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ghost_conf::{review, ConfigurationConflict, ConfigurationRegistry, SettingsKey};
use ghost_constructs::{ConstructScope, ImportLookup, ParameterEntry, Template};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StackResult;
use crate::graph::{Composition, CompositionGraph};

/// Manifest of a composition run: what would be provisioned and what would
/// be published.
#[derive(Debug, Clone, Serialize)]
pub struct Synthesis {
    pub run_id: Uuid,
    pub account: String,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub order: Vec<String>,
    pub template: Template,
    pub parameters: Vec<ParameterEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConfigurationConflict>,
}

/// Composes `graph` for `target`, with settings from `registry`.
pub struct Synthesizer<'a> {
    registry: &'a ConfigurationRegistry,
    lookup: Arc<dyn ImportLookup>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(registry: &'a ConfigurationRegistry, lookup: Arc<dyn ImportLookup>) -> Self {
        Self { registry, lookup }
    }

    pub fn synthesize(&self, graph: &CompositionGraph, target: &SettingsKey) -> StackResult<Synthesis> {
        let run_id = Uuid::new_v4();
        info!("Synthesizing {} for {} (run {})", graph.len(), target, run_id);

        let settings = self.registry.resolve(&target.account, &target.region);
        let conflicts = review(&settings);
        for conflict in &conflicts {
            warn!("{}", conflict);
        }

        let mut scope = ConstructScope::new(target.clone(), settings, Arc::clone(&self.lookup))?;
        let Composition { order, .. } = graph.compose(&mut scope)?;
        let (parameters, template) = scope.into_parts();

        info!(
            "Synthesized {} resources and {} parameters",
            template.len(),
            parameters.len()
        );

        Ok(Synthesis {
            run_id,
            account: target.account.clone(),
            region: target.region.clone(),
            created_at: Utc::now(),
            order,
            template,
            parameters: parameters.into_entries(),
            conflicts,
        })
    }
}
