//! CLI command definitions and dispatch.

pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use parley_core::config::AppConfig;
use parley_core::error::AppError;

/// Parley: presence-aware chat fan-out server
#[derive(Debug, Parser)]
#[command(name = "parley-server", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay to load from `config/<env>.toml`
    #[arg(long, env = "PARLEY_ENV", default_value = "development")]
    pub env: String,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP/WebSocket server
    Serve,
    /// Mint a development access token
    Token(token::TokenArgs),
}

impl Cli {
    /// Load `config/default.toml`, the environment overlay and `PARLEY__*` variables.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            None | Some(Commands::Serve) => serve::execute(config).await,
            Some(Commands::Token(args)) => token::execute(args, &config),
        }
    }
}
