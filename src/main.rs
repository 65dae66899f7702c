mod categorizer;
mod charts;
mod cli;
mod error;
mod export;
mod filter;
mod fmt;
mod forecast;
mod loader;
mod models;
mod reports;
mod settings;
mod web;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else if matches!(cli.command, Commands::Serve { .. }) {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let result = match cli.command {
        Commands::Summary { filters } => cli::report::summary(&filters),
        Commands::Transactions { filters, limit } => cli::report::transactions(&filters, limit),
        Commands::Analytics { filters } => cli::report::analytics(&filters),
        Commands::Insights { filters } => cli::report::insights(&filters),
        Commands::Forecast { filters } => cli::report::forecast(&filters),
        Commands::Export { filters, output } => cli::export::run(&filters, &output),
        Commands::Categories => cli::categories::list(),
        Commands::Init { force } => cli::init::run(force),
        Commands::Serve { file, host, port } => cli::serve::run(file, host, port).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "fintrack", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
