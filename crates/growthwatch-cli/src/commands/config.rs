//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use growthwatch_core::error::AppError;

use super::Cli;
use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with secrets masked
    Show,
    /// Validate the merged configuration
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    let env = cli.environment();

    match &args.command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            output::print_item(&config.redacted(), cli.format);
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!(
                    "Configuration '{}' ({}) is valid",
                    cli.config, env
                ));
                output::print_kv(
                    "Server",
                    &format!("{}:{}", config.server.host, config.server.port),
                );
                output::print_kv("Identity provider", &config.identity.provider.to_string());
                output::print_kv("Profile store", &config.profiles.backend.to_string());
                output::print_kv("Required role", &config.auth.required_role);
                if let Some(db) = config.redacted().database {
                    output::print_kv("Database", &db.url);
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
