//! Sign in against a running server.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use growthwatch_client::AuthClient;
use growthwatch_client::types::UserSummary;
use growthwatch_core::config::AppConfig;
use growthwatch_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Base URL of the GrowthWatch server
    #[arg(short, long, default_value = "http://localhost:3000")]
    pub url: String,

    /// Sign-in email
    #[arg(short, long)]
    pub email: String,

    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Signed-in user row for table output
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct UserRow {
    /// User ID
    id: String,
    /// Email
    email: String,
    /// Display name
    name: String,
    /// Role
    role: String,
}

impl From<&UserSummary> for UserRow {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone().unwrap_or_default(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

/// Helper: build a client and sign in, prompting for the password when needed
pub(crate) async fn sign_in(
    url: &str,
    email: &str,
    password: Option<&str>,
    config: &AppConfig,
) -> Result<(AuthClient, UserSummary), AppError> {
    let password = match password {
        Some(p) => p.to_string(),
        None => super::prompt_password("Password")?,
    };

    let client = AuthClient::new(url, &config.monitor)?;
    let user = client.login(email, &password).await?;
    Ok((client, user))
}

/// Execute the login command
pub async fn execute(
    args: &LoginArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (client, user) = sign_in(&args.url, &args.email, args.password.as_deref(), config).await?;

    output::print_success(&format!("Signed in to {}", args.url));
    output::print_row(&UserRow::from(&user), format);

    let status = client.session().await?;
    match status.expires_at {
        Some(expires_at) if status.valid => {
            output::print_kv("Session expires at", &expires_at.to_string());
        }
        _ => output::print_warning("Server did not confirm the new session"),
    }

    client.logout().await?;
    Ok(())
}
