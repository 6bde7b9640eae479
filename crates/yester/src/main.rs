//! yester - historical events by year, region and topic
//!
//! Terminal front end over the yester-core resolution pipeline.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod cli;
mod commands;
mod config;
mod selection;

use app::{App, BuildOptions};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over the default directive
    let default_directive = if cli.verbose { "yester=debug" } else { "yester=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration
    let config = config::Config::load()?;

    let options = BuildOptions {
        ephemeral: cli.ephemeral,
        offline: cli.offline,
    };

    // Execute command
    match cli.command {
        Commands::Show(cmd) => {
            let app = App::build(&config, options)?;
            commands::show::execute(cmd, &app).await
        }
        Commands::Scrub(cmd) => {
            let app = App::build(&config, options)?;
            let debounce = config.content.resolution.debounce();
            commands::scrub::execute(cmd, &app, debounce).await
        }
        Commands::Stats { json } => {
            let app = App::build(&config, options)?;
            commands::stats::execute(json, &app).await
        }
        Commands::Cache(cmd) => {
            let app = App::build(&config, options)?;
            commands::cache::execute(cmd, &app).await
        }
        Commands::Doctor => commands::doctor::execute(&config).await,
        Commands::Version => {
            println!("yester {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
