use clap::{Parser, Subcommand};

/// LeanDojo startup checks and configuration
#[derive(Parser)]
#[command(name = "dojo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (same as setting VERBOSE)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the startup checks
    Check {
        /// Skip GitHub token validation and repository resolution
        #[arg(long)]
        no_github: bool,

        /// Skip the git version check
        #[arg(long)]
        no_git: bool,

        /// Skip the Docker check and image pull
        #[arg(long)]
        no_container: bool,
    },
    /// Print the resolved configuration
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a GitHub repository URL and its latest commit
    Repo {
        /// Repository URL, e.g. https://github.com/leanprover-community/mathlib4
        url: String,
    },
}
