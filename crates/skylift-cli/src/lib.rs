//! Command-line interface for the Skylift deployment helper.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;

use skylift_core::error::SkyliftError;

mod commands;
mod gitops;
mod output;

pub use gitops::GitStatus;
pub use output::*;

static LOGGING: OnceCell<()> = OnceCell::new();

fn init_logging(verbose: bool) {
    let _ = LOGGING.get_or_init(|| {
        let level = if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
            )
            .with_target(false)
            .try_init();
    });
}

/// CLI arguments parser
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the credential dump to extract deployment inputs from
    #[arg(short, long, value_name = "FILE", default_value = "ENV_VARS_COMPLETE.txt")]
    pub env_file: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: Redis, artifacts, git push, worker service
    Deploy {
        /// GitHub repository URL or owner/repo slug
        #[arg(short, long)]
        repo: Option<String>,

        /// Skip the git commit-and-push step
        #[arg(long)]
        no_git: bool,

        /// Directory for generated artifacts
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Provision only the background worker service
    Worker {
        /// Use this project instead of searching by name
        #[arg(long)]
        project_id: Option<String>,

        /// GitHub repository URL or owner/repo slug
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Create the web service on Render
    Render {
        /// GitHub repository URL or owner/repo slug
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Check credentials, artifacts, git state, and remote services
    Verify {
        /// Railway projects to inspect
        #[arg(long = "project-id")]
        project_ids: Vec<String>,

        /// Directory holding the generated artifacts
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print resolved deployment inputs and write .env.example
    Extract {
        /// Directory for the .env.example reference
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// Run the CLI application
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Deploy {
            repo,
            no_git,
            output,
        } => commands::deploy::execute(&cli.env_file, repo, no_git, &output).await,
        Commands::Worker { project_id, repo } => {
            commands::worker::execute(&cli.env_file, project_id, repo).await
        }
        Commands::Render { repo } => commands::render::execute(&cli.env_file, repo).await,
        Commands::Verify {
            project_ids,
            output,
        } => commands::verify::execute(&cli.env_file, &project_ids, &output).await,
        Commands::Extract { output } => commands::extract::execute(&cli.env_file, &output),
    };

    if let Err(e) = &result {
        if matches!(e, SkyliftError::Unauthorized(_)) {
            output::warn_line(
                "The platform rejected the credential. Generate a fresh token and update the env file.",
            );
        }
        anyhow::bail!("{}", e);
    }
    Ok(())
}
