//! Composition graph.
//!
//! Units are linearized with a depth-first search using three-colour marking:
//! a unit on the current path is grey, a finished unit black. Meeting a grey
//! unit again means a cycle. Units are emitted post-order, so dependencies
//! come first, and independent units keep their registration order.

use std::collections::{HashMap, HashSet};

use ghost_constructs::ConstructScope;
use tracing::{debug, info};

use crate::error::{StackError, StackResult};
use crate::unit::{Unit, UnitContext, UnitOutput};

/// Registered units and their declared dependencies.
#[derive(Default)]
pub struct CompositionGraph {
    units: Vec<Box<dyn Unit>>,
    index: HashMap<String, usize>,
}

/// Result of composing a graph.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Unit names in construction order.
    pub order: Vec<String>,
    pub outputs: HashMap<String, UnitOutput>,
}

impl Composition {
    pub fn output(&self, unit: &str) -> Option<&UnitOutput> {
        self.outputs.get(unit)
    }
}

struct SortContext<'a> {
    graph: &'a CompositionGraph,
    /// Finished units (black).
    visited: HashSet<String>,
    /// Units on the current path (grey), in visiting order.
    path: Vec<String>,
    result: Vec<String>,
}

impl CompositionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Names are unique within a graph.
    pub fn register(&mut self, unit: Box<dyn Unit>) -> StackResult<()> {
        let name = unit.name().to_string();
        if self.index.contains_key(&name) {
            return Err(StackError::DuplicateUnit(name));
        }

        debug!("Registering unit: {}", name);
        self.index.insert(name, self.units.len());
        self.units.push(unit);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Unit> {
        self.index.get(name).map(|&i| self.units[i].as_ref())
    }

    /// Unit names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Linearize the graph: every unit comes after all of its dependencies,
    /// data and ordering alike.
    pub fn order(&self) -> StackResult<Vec<String>> {
        self.validate()?;

        let mut ctx = SortContext {
            graph: self,
            visited: HashSet::new(),
            path: Vec::new(),
            result: Vec::with_capacity(self.units.len()),
        };
        for unit in &self.units {
            if !ctx.visited.contains(unit.name()) {
                visit(&mut ctx, unit.name())?;
            }
        }
        Ok(ctx.result)
    }

    /// Construct every unit once, in dependency order.
    ///
    /// Ordering is computed up front, so a cycle is reported before any unit
    /// runs. The first failing unit aborts the composition.
    pub fn compose(&self, scope: &mut ConstructScope) -> StackResult<Composition> {
        let order = self.order()?;
        info!("Composing {} units: {}", order.len(), order.join(", "));

        let units: Vec<&dyn Unit> = order.iter().filter_map(|name| self.get(name)).collect();
        let mut outputs: HashMap<String, UnitOutput> = HashMap::new();
        for (i, (name, unit)) in order.iter().zip(units).enumerate() {
            info!("Constructing unit [{}/{}]: {}", i + 1, order.len(), name);

            let dependencies = unit.dependencies();
            let output = {
                let mut context = UnitContext::new(name, &dependencies, &outputs, scope);
                unit.construct(&mut context)?
            };
            outputs.insert(name.clone(), output);
        }

        Ok(Composition { order, outputs })
    }

    fn validate(&self) -> StackResult<()> {
        for unit in &self.units {
            for dependency in unit.dependencies() {
                if !self.index.contains_key(dependency.name()) {
                    return Err(StackError::UnknownUnit {
                        unit: unit.name().to_string(),
                        dependency: dependency.name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn visit(ctx: &mut SortContext<'_>, name: &str) -> StackResult<()> {
    if let Some(start) = ctx.path.iter().position(|n| n == name) {
        let mut chain = ctx.path[start..].to_vec();
        chain.push(name.to_string());
        return Err(StackError::DependencyCycle {
            chain: chain.join(" -> "),
        });
    }
    if ctx.visited.contains(name) {
        return Ok(());
    }

    ctx.path.push(name.to_string());
    let dependencies = ctx
        .graph
        .get(name)
        .map(|unit| unit.dependencies())
        .unwrap_or_default();
    for dependency in &dependencies {
        visit(ctx, dependency.name())?;
    }
    ctx.path.pop();

    ctx.visited.insert(name.to_string());
    ctx.result.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ghost_conf::{Settings, SettingsKey};
    use ghost_constructs::StaticLookup;

    use crate::unit::Dependency;

    struct TestUnit {
        name: &'static str,
        dependencies: Vec<Dependency>,
        reads: Option<&'static str>,
        runs: Arc<AtomicUsize>,
    }

    impl Unit for TestUnit {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test unit"
        }

        fn dependencies(&self) -> Vec<Dependency> {
            self.dependencies.clone()
        }

        fn construct(&self, context: &mut UnitContext<'_>) -> StackResult<UnitOutput> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(dependency) = self.reads {
                context.output(dependency)?;
            }
            Ok(UnitOutput::Unit)
        }
    }

    fn unit(name: &'static str, dependencies: Vec<Dependency>, runs: &Arc<AtomicUsize>) -> Box<dyn Unit> {
        Box::new(TestUnit {
            name,
            dependencies,
            reads: None,
            runs: Arc::clone(runs),
        })
    }

    fn scope() -> ConstructScope {
        ConstructScope::new(
            SettingsKey::new("111111111111", "eu-west-1"),
            Arc::new(Settings::default()),
            Arc::new(StaticLookup::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_dependencies_first_registration_order_kept() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("service", vec![Dependency::data("cluster")], &runs)).unwrap();
        graph.register(unit("assets", vec![], &runs)).unwrap();
        graph.register(unit("cluster", vec![Dependency::data("network")], &runs)).unwrap();
        graph.register(unit("network", vec![], &runs)).unwrap();

        assert_eq!(
            graph.order().unwrap(),
            vec!["network", "cluster", "service", "assets"]
        );
    }

    #[test]
    fn test_cycle_detected_before_any_unit_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("independent", vec![], &runs)).unwrap();
        graph.register(unit("a", vec![Dependency::data("b")], &runs)).unwrap();
        graph.register(unit("b", vec![Dependency::order("a")], &runs)).unwrap();

        let err = graph.compose(&mut scope()).unwrap_err();

        match err {
            StackError::DependencyCycle { chain } => assert_eq!(chain, "a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("a", vec![Dependency::order("a")], &runs)).unwrap();

        assert!(matches!(graph.order(), Err(StackError::DependencyCycle { .. })));
    }

    #[test]
    fn test_unknown_and_duplicate_units() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("a", vec![Dependency::data("missing")], &runs)).unwrap();

        assert!(matches!(
            graph.order(),
            Err(StackError::UnknownUnit { ref dependency, .. }) if dependency == "missing"
        ));
        assert!(matches!(
            graph.register(unit("a", vec![], &runs)),
            Err(StackError::DuplicateUnit(_))
        ));
    }

    #[test]
    fn test_diamond_constructs_each_unit_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("top", vec![Dependency::data("left"), Dependency::data("right")], &runs)).unwrap();
        graph.register(unit("left", vec![Dependency::data("base")], &runs)).unwrap();
        graph.register(unit("right", vec![Dependency::data("base")], &runs)).unwrap();
        graph.register(unit("base", vec![], &runs)).unwrap();

        let composition = graph.compose(&mut scope()).unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 4);
        assert_eq!(composition.order, vec!["base", "left", "right", "top"]);
        assert_eq!(composition.output("base"), Some(&UnitOutput::Unit));
    }

    #[test]
    fn test_order_dependency_output_not_visible() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = CompositionGraph::new();
        graph.register(unit("image", vec![], &runs)).unwrap();
        graph
            .register(Box::new(TestUnit {
                name: "service",
                dependencies: vec![Dependency::order("image")],
                reads: Some("image"),
                runs: Arc::clone(&runs),
            }))
            .unwrap();

        let err = graph.compose(&mut scope()).unwrap_err();
        assert!(matches!(
            err,
            StackError::MissingOutput { ref unit, ref dependency } if unit == "service" && dependency == "image"
        ));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
