use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crnwatch::api::router;
use crnwatch::banner::{BannerClient, BannerConfig};
use crnwatch::db::{MIGRATOR, WatchStore};
use crnwatch::services::{DiscordWebhook, SeatMonitor};
use crnwatch::state::AppState;

const DEFAULT_POLL_SECONDS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "crnwatch=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://crnwatch.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    MIGRATOR.run(&pool).await?;

    let store = WatchStore::new(pool);
    let registration = Arc::new(BannerClient::new(BannerConfig::new_from_env()?)?);
    let notifier = Arc::new(DiscordWebhook::new()?);

    let poll_secs = std::env::var("POLL_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POLL_SECONDS);

    let monitor = SeatMonitor::new(store.clone(), registration.clone(), notifier, poll_secs);
    tokio::spawn(monitor.start());

    let state = AppState { store, registration };
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
