use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dishcast::{DishcastConfig, PredictionService, telemetry, web};

#[derive(Parser, Debug)]
#[command(name = "dishcast", version, about = "Predict popular dishes for a location")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the configured one
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = DishcastConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    let _telemetry = telemetry::init(&config.logging)?;

    let service = match PredictionService::from_config(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    web::run(&config.web, service).await?;
    Ok(ExitCode::SUCCESS)
}
