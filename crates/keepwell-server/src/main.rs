mod auth;
mod error;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use keepwell_domains::retrieval::RetrievalService;
use keepwell_domains::save_service::SaveService;
use tracing_subscriber::EnvFilter;

use auth::JwtService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    tracing::info!("starting keepwell-server");

    let config = keepwell_core::AppConfig::from_env()?;
    let port = config.port;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("migrations complete");

    let sqs_client = Arc::new(
        sqs_client::SqsClient::from_env(
            config.sqs_content_queue_url.clone(),
            config.sqs_clustering_queue_url.clone(),
            config.queue_wait_time_secs,
            config.queue_visibility_timeout_secs,
        )
        .await,
    );

    let jwt_service = JwtService::new(&config.jwt_secret, "keepwell".to_string(), config.jwt_expiry_seconds);
    let save_service = Arc::new(SaveService::new(pool.clone(), sqs_client));
    let retrieval = Arc::new(RetrievalService::new(pool.clone()));

    let state = routes::AppState {
        pool,
        jwt_service,
        save_service,
        retrieval,
    };

    let app = routes::build_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
