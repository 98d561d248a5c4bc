pub mod commands;
pub mod config;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "gate")]
#[command(about = "Gate CLI - log in, store the session token and check route access")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Backend or gate base URL (defaults to GATE_API_BASE_URL)")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Check whether a page path is reachable with the stored session")]
    Check {
        #[arg(help = "Page path, e.g. /prices")]
        path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Resolved settings shared by every command
pub struct CliContext {
    pub output_format: OutputFormat,
    pub config: AppConfig,
    /// Where the session file lives
    pub config_dir: PathBuf,
}

impl CliContext {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = crate::config::config().clone();
        if let Some(url) = &cli.api_url {
            config.backend.base_url = url.trim().to_string();
        }

        Ok(Self {
            output_format: OutputFormat::from_cli(cli),
            config,
            config_dir: config::get_config_dir()?,
        })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::from_cli(&cli)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Check { path } => commands::check::handle(&path, &ctx),
    }
}
