//! ghost-infra CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Import lookup failure
//! - 5: Composition error

use std::process::ExitCode;

use clap::Parser;
use ghost_conf::ConfError;
use ghost_constructs::ConstructError;
use ghost_stack::StackError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const IMPORT_ERROR: u8 = 4;
    pub const COMPOSITION_ERROR: u8 = 5;
}

const LOG_TARGETS: &[&str] = &["ghost_cli", "ghost_conf", "ghost_constructs", "ghost_stack"];

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Synth(args) => commands::synth::execute(args),
        Commands::Order(args) => commands::order::execute(args),
        Commands::PathFor(args) => commands::path_for::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logging may already be initialised; keep going either way.
    let _ = if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    };
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<StackError>() {
            return match err {
                StackError::Construct(inner) => categorize_construct_error(inner),
                _ => ExitCodes::COMPOSITION_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<ConstructError>() {
            return categorize_construct_error(err);
        }
        if cause.downcast_ref::<ConfError>().is_some() {
            return ExitCodes::CONFIG_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn categorize_construct_error(e: &ConstructError) -> u8 {
    match e {
        ConstructError::ImportLookupNotFound { .. } | ConstructError::ImportLookupIncomplete { .. } => {
            ExitCodes::IMPORT_ERROR
        }
        ConstructError::InvalidPrefix(_) => ExitCodes::INVALID_ARGS,
        ConstructError::Settings(_) | ConstructError::Io(_) | ConstructError::Yaml(_) => {
            ExitCodes::CONFIG_ERROR
        }
        ConstructError::DuplicatePath(_) | ConstructError::DuplicateLogicalId(_) => {
            ExitCodes::COMPOSITION_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categorize_error() {
        let lookup: anyhow::Error = StackError::Construct(ConstructError::ImportLookupNotFound {
            kind: ghost_constructs::ResourceKind::Vpc,
            identifier: "vpc-1".to_string(),
        })
        .into();
        assert_eq!(categorize_error(&lookup), ExitCodes::IMPORT_ERROR);

        let cycle: anyhow::Error = StackError::DependencyCycle {
            chain: "a -> b -> a".to_string(),
        }
        .into();
        assert_eq!(categorize_error(&cycle), ExitCodes::COMPOSITION_ERROR);

        let prefix = Err::<(), _>(ConstructError::InvalidPrefix("a/b".to_string()))
            .context("Invalid prefix")
            .unwrap_err();
        assert_eq!(categorize_error(&prefix), ExitCodes::INVALID_ARGS);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("something else")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
