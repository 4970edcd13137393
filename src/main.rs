//! Storefront Pricing - coupon validation and checkout totals service

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_pricing::api::{self, AppState};
use storefront_pricing::config::Config;
use storefront_pricing::publisher::EventPublisher;
use storefront_pricing::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(config.max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("database migrations applied");
    let events = match &config.nats_url {
        Some(url) => EventPublisher::connect(url).await,
        None => EventPublisher::disabled(),
    };
    tracing::info!(nats = events.is_enabled(), "event publishing configured");

    let store = Arc::new(PgStore::new(db));
    let app = api::router(AppState::new(store.clone(), store, events))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let addr = config.listen_addr();
    tracing::info!("🚀 Storefront Pricing listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
