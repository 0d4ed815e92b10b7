//! Main entry point for Banner Studio

use banner_studio::{api, config::{LoggingConfig, Settings}, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "pretty" {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    init_tracing(&settings.logging);

    info!("Starting Banner Studio");
    settings.validate()?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        model = %settings.generation.model,
        "Loaded configuration"
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    // Missing secrets leave the server up with generation disabled
    let app_state = Arc::new(AppState::from_settings(settings));

    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
