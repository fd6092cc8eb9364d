//! Path-for command - Predict where a value is published.

use anyhow::{Context, Result};
use clap::Args;
use ghost_constructs::ParameterRegistry;

use super::TargetArgs;

#[derive(Args)]
pub struct PathForArgs {
    /// Parameter suffixes, e.g. `vpc/id`
    #[arg(required = true)]
    suffixes: Vec<String>,

    /// Prefix to use instead of the target's configured one
    #[arg(short, long)]
    prefix: Option<String>,

    #[command(flatten)]
    target: TargetArgs,
}

pub fn execute(args: PathForArgs) -> Result<()> {
    let prefix = match args.prefix {
        Some(prefix) => prefix,
        None => {
            let registry = args.target.registry()?;
            registry
                .resolve(&args.target.account, &args.target.region)
                .prefix_name
                .clone()
        }
    };

    let parameters =
        ParameterRegistry::new(prefix.as_str()).with_context(|| format!("Invalid prefix '{}'", prefix))?;
    for suffix in &args.suffixes {
        println!("{}", parameters.path_for(suffix));
    }
    Ok(())
}
