//! sfgen CLI: generates Crystal bindings from flattened CSFML headers.

mod commands;
mod manifest;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SFGEN_LOG";

#[derive(Parser)]
#[command(name = "sfgen", version, about = "CSFML to Crystal binding generator")]
struct Cli {
    /// Defaults to `generate`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate `<module>_lib.cr` and `<module>.cr` for every module
    Generate {
        /// Render without writing and fail if any file on disk differs
        #[arg(long)]
        check: bool,
    },
    /// Print the parsed declaration stream as JSON
    Inspect {
        /// Only print the declarations of this module
        #[arg(long)]
        module: Option<String>,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = manifest::load_run_config(&cwd)?;

    match cli.command.unwrap_or(Commands::Generate { check: false }) {
        Commands::Generate { check } => commands::generate::run(&config, check),
        Commands::Inspect { module } => commands::inspect::run(&config, module.as_deref()),
    }
}
