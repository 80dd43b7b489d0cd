//! rbacgen - RBAC role generator for Deckhouse modules
//!
//! Scans a source tree for modules, writes their `manage` and `use` cluster
//! roles below each module and a capability index to the docs path.
//!
//! ```text
//! rbacgen generate <workdir> <docs-path> [--owner-module <name>] [-v]
//! ```
//!
//! # Environment Variables
//!
//! - `RBACGEN_DESCRIPTOR_FILE`: module descriptor file name
//! - `RBACGEN_POLICY_FILE`: module policy file name
//! - `RBACGEN_TEMPLATES_PATH`: role output directory inside each module
//! - `RBACGEN_SKIPPED_DIRS`: comma-separated directory names to skip
//! - `RBACGEN_OWNER_MODULE`: module exempt from the moduleconfig rule
//! - `RUST_LOG`: log filter, overridden by `--verbose`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rbacgen_engine::{Generator, GeneratorConfig};

/// RBAC role generator for Deckhouse modules
#[derive(Parser, Debug)]
#[command(name = "rbacgen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate module roles and the capability documentation
    Generate {
        /// Source tree to scan for modules
        workdir: PathBuf,

        /// Documentation index destination (`.json` writes JSON)
        docs_path: PathBuf,

        /// Module exempt from the moduleconfig rule
        #[arg(long, env = "RBACGEN_OWNER_MODULE")]
        owner_module: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            workdir,
            docs_path,
            owner_module,
        } => {
            let mut config = GeneratorConfig::from_env();
            if let Some(owner) = owner_module {
                config = config.with_owner_module(owner);
            }

            let summary = Generator::new(config)
                .run(&workdir, &docs_path)
                .with_context(|| format!("failed to generate roles for {}", workdir.display()))?;

            info!(
                "generated {} roles for {} modules, docs written to {}",
                summary.roles,
                summary.modules,
                summary.docs_path.display()
            );
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
