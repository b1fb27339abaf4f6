//! Start the GrowthWatch server.

use clap::Args;

use growthwatch_core::config::AppConfig;
use growthwatch_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the directory of pre-built pages
    #[arg(long)]
    pub pages_dir: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut config = config.clone();

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref dir) = args.pages_dir {
        config.server.pages_dir = dir.clone();
    }

    println!("Starting GrowthWatch server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);
    println!("  Identity provider: {}", config.identity.provider);
    println!("  Profile store: {}", config.profiles.backend);

    growthwatch_api::run_server(config).await
}
