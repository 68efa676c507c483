use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the admin server.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lapse_admin_server=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("📊 Telemetry initialized");
}
