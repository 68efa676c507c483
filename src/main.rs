use tracing::{error, info};

use crate::config::AppConfig;
use crate::types::CameraRegistry;

mod config;
mod photos;
mod query;
mod telemetry;
mod types;
mod web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    telemetry::init_telemetry();

    let config = AppConfig::load("config.json")?;
    info!("⚙️ Configuration loaded: {:?}", config);

    let registry = CameraRegistry::new(config.status_path());

    info!("🚀 Starting timelapse admin server...");
    if let Err(e) = web::start_web_server(config, registry).await {
        error!("Web server failed: {}", e);
        return Err(e);
    }

    info!("🛑 Server shutdown complete");
    Ok(())
}
