use anyhow::Result;
use clap::Parser;
use tracing::Level;

mod cli;
mod command;

use cli::{Cli, Commands};
use dojo::config::{self, DojoConfig};
use dojo::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging before resolving config so parse errors are visible
    let env = config::env_snapshot();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        env.as_ref()
            .map(logging::level_from_env)
            .unwrap_or(Level::INFO)
    };
    logging::init(level);

    let config = DojoConfig::from_env_map(&env?)?;

    match cli.command {
        Some(Commands::Check {
            no_github,
            no_git,
            no_container,
        }) => {
            command::run_check(config, no_github, no_git, no_container).await?;
        }
        Some(Commands::Config { json }) => {
            command::run_config(&config, json).await?;
        }
        Some(Commands::Repo { url }) => {
            command::run_repo(&config, &url).await?;
        }
        None => {
            // No command specified, show help
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'dojo check' to run the startup checks or 'dojo config' to inspect settings.");
        }
    }

    Ok(())
}
