//! # wikitree CLI
//!
//! Command-line interface for the wikitree static site generator.

mod commands;

use clap::{Parser, Subcommand};
use commands::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wikitree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = commands::DEFAULT_CONFIG)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check every internal link without writing output
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the resolved navigation tree
    Tree {
        #[command(flatten)]
        overrides: Overrides,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout stays free for command output
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build { overrides } => {
            let config = commands::load_config(&cli.config, &overrides)?;
            commands::build_site(config)
        }
        Commands::Check { json, overrides } => {
            let config = commands::load_config(&cli.config, &overrides)?;
            commands::check_site(config, json)
        }
        Commands::Tree { overrides } => {
            let config = commands::load_config(&cli.config, &overrides)?;
            commands::print_tree(&config)
        }
    }
}
