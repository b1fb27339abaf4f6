//! CLI command definitions and dispatch.

pub mod config;
pub mod hash_password;
pub mod login;
pub mod monitor;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use growthwatch_core::config::AppConfig;
use growthwatch_core::error::AppError;

/// GrowthWatch: admin session layer for the child-growth dashboard
#[derive(Debug, Parser)]
#[command(name = "growthwatch", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to merge (falls back to GROWTHWATCH_ENV, then "development")
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the GrowthWatch server
    Serve(serve::ServeArgs),
    /// Sign in against a running server and print the admin identity
    Login(login::LoginArgs),
    /// Sign in and keep the session alive until Ctrl+C
    Monitor(monitor::MonitorArgs),
    /// Hash a password for a local account seed
    HashPassword(hash_password::HashPasswordArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.load_config()?).await,
            Commands::Login(args) => login::execute(args, &self.load_config()?, self.format).await,
            Commands::Monitor(args) => monitor::execute(args, &self.load_config()?).await,
            Commands::HashPassword(args) => hash_password::execute(args),
            Commands::Config(args) => config::execute(args, self),
        }
    }

    /// Log level used when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        match self.command {
            Commands::Serve(_) | Commands::Monitor(_) => "info",
            _ => "warn",
        }
    }

    /// Resolved environment overlay name.
    pub fn environment(&self) -> String {
        self.env
            .clone()
            .or_else(|| std::env::var("GROWTHWATCH_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Helper: load and validate the merged configuration
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.environment())
    }
}

/// Helper: read a password from the terminal
pub fn prompt_password(prompt: &str) -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
