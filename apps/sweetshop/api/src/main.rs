use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use sweetshop_api::{Config, MongoState, api};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(database = %config.mongodb.database, "Connecting to MongoDB");

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(&config.mongodb.database);

    let state = MongoState::connect(&db, &config).await?;
    info!(
        role_policy = ?config.role_policy,
        uploads = config.media.cloudinary.is_some(),
        "Services initialized"
    );

    let api_routes = api::routes(&state).merge(api::health::router(mongo_client.clone()));
    let app = sweetshop_api::app(api_routes, config.app.clone())?;

    info!("Starting Sweetshop API with graceful shutdown (30s timeout)");

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Sweetshop API shutdown complete");
    Ok(())
}
