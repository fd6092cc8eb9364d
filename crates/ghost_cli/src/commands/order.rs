//! Order command - Print the units in construction order.

use anyhow::Result;
use clap::Args;
use ghost_stack::{ghost_blog_graph, Dependency};

#[derive(Args)]
pub struct OrderArgs {
    /// Also print each unit's description and dependencies
    #[arg(short, long)]
    detailed: bool,
}

pub fn execute(args: OrderArgs) -> Result<()> {
    let graph = ghost_blog_graph()?;

    for (i, name) in graph.order()?.iter().enumerate() {
        let Some(unit) = graph.get(name) else {
            continue;
        };
        if !args.detailed {
            println!("{}", name);
            continue;
        }

        println!("{}. {} - {}", i + 1, name, unit.description());
        let dependencies = unit.dependencies();
        if !dependencies.is_empty() {
            let listed: Vec<String> = dependencies.iter().map(describe).collect();
            println!("   after: {}", listed.join(", "));
        }
    }
    Ok(())
}

fn describe(dependency: &Dependency) -> String {
    match dependency {
        Dependency::Data(name) => name.clone(),
        Dependency::Order(name) => format!("{} (order only)", name),
    }
}
