//! kvbatch CLI
//!
//! Command-line interface for running atomic command batches

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kvbatch_core::logging_facility;

mod commands;
mod script;
mod settings;

use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "kvbatch")]
#[command(about = "kvbatch - atomic command batches for key-value stores", long_about = None)]
struct Cli {
    /// Settings file (default: ./kvbatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Stage every line of a script into one batch and commit it
    Run(commands::run::RunArgs),
    /// List the operations the configured store can stage
    Ops(commands::ops::OpsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    logging_facility::init(settings.log_profile());

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &settings).await,
        Commands::Ops(args) => commands::ops::execute(args, &settings).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
