//! Development server for admin console UI development
//!
//! This binary runs the in-memory mock API with a directory of users and a
//! day of performance samples, so the UI can be exercised without the real
//! backend or identity provider.
//!
//! Environment variables can be set directly or loaded from a .env file:
//! - IP_ADDRESS: bind address (default 127.0.0.1)
//! - PORT: server port (default 8000)
//! - ALLOWED_ORIGINS: CORS origins, "*" or a comma-separated list
//! - FRONTEND_URL: where sign-in redirects to (default http://localhost:8080)
//!
//! Usage: cargo run -p dev-server

use anyhow::Result;
use test_helpers::mock::DevDataset;
use test_helpers::server::Config;
use test_helpers::telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Silently ignored if there is no .env file
    let _ = dotenvy::dotenv();

    init_subscriber(get_subscriber("info".into()))?;

    info!("🚀 Starting admin console development server");
    let config = Config::from_env()?;
    let app = test_helpers::spawn_app_with(config).await?;
    info!("✅ Mock API running on {}", app.address());

    info!("📊 Setting up development test data...");
    let dataset = DevDataset::create(&app);

    info!("🎯 Development server ready!");
    info!("   API: {}", app.address());
    info!("   UI:  cd ui && BACKEND_URL={} trunk serve", app.address());
    info!("");
    dataset.print_summary(&app);
    info!("");
    info!("👋 Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    info!("🛑 Shutting down development server");
    Ok(())
}
