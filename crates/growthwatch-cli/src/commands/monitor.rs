//! Keep a signed-in session alive.

use std::sync::Arc;

use clap::Args;
use tokio::sync::broadcast::error::RecvError;

use growthwatch_client::{SessionEvent, SessionMonitor};
use growthwatch_core::config::AppConfig;
use growthwatch_core::error::AppError;

use crate::output;

/// Arguments for the monitor command
#[derive(Debug, Args)]
pub struct MonitorArgs {
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

/// Execute the monitor command
pub async fn execute(args: &MonitorArgs, config: &AppConfig) -> Result<(), AppError> {
    let (client, user) =
        super::login::sign_in(&args.url, &args.email, args.password.as_deref(), config).await?;
    output::print_success(&format!("Signed in as {} ({})", user.name, user.role));

    let client = Arc::new(client);
    let mut events = client.subscribe();
    let handle = SessionMonitor::new(Arc::clone(&client), &config.monitor).start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                output::print_warning("Interrupted, signing out");
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Healthy { expires_at }) => {
                    output::print_kv("Session healthy until", &expires_at.to_string());
                }
                Ok(SessionEvent::Refreshed { expires_at }) => {
                    output::print_kv("Session refreshed until", &expires_at.to_string());
                }
                Ok(SessionEvent::Unauthorized) => {
                    output::print_warning("Request rejected with 401");
                }
                Ok(SessionEvent::Expired) => {
                    output::print_error("Session expired, sign in again");
                    handle.shutdown().await;
                    return Err(AppError::authentication("Session expired"));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Monitor output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    handle.shutdown().await;
    client.logout().await?;
    Ok(())
}
