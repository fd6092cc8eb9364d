//! Synth command - Compose the stack and emit the synthesis manifest.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ghost_constructs::StaticLookup;
use ghost_stack::{ghost_blog_graph, Synthesis, Synthesizer};
use tracing::info;

use super::TargetArgs;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// YAML file describing the existing resources imports may refer to
    #[arg(short, long)]
    lookup: Option<PathBuf>,

    /// Manifest format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the manifest to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

pub fn execute(args: SynthArgs) -> Result<()> {
    let registry = args.target.registry()?;
    let lookup = match &args.lookup {
        Some(path) => StaticLookup::from_file(path)
            .with_context(|| format!("Failed to load lookup file {}", path.display()))?,
        None => StaticLookup::new(),
    };
    info!("Import lookup knows {} resources", lookup.len());

    let graph = ghost_blog_graph()?;
    let synthesis = Synthesizer::new(&registry, Arc::new(lookup)).synthesize(&graph, &args.target.key())?;

    let rendered = render(&synthesis, args.format)?;
    match &args.out {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
            info!("Manifest written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if !synthesis.conflicts.is_empty() {
        eprintln!(
            "⚠️  {} settings group(s) ignored because an import takes precedence",
            synthesis.conflicts.len()
        );
    }
    Ok(())
}

fn render(synthesis: &Synthesis, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(synthesis)?,
        OutputFormat::Yaml => serde_yaml::to_string(synthesis)?,
    };
    Ok(rendered)
}
