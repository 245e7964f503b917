pub mod adapters;
pub mod consumer;

pub use adapters::{OpenAiEmbeddingService, QdrantVectorIndex};

use std::sync::Arc;

use anyhow::Result;
use keepwell_core::deps::ServiceDeps;
use keepwell_domains::ingest::HttpIngestor;

/// Build the shared dependency container both worker binaries run against.
pub async fn build_deps(config: keepwell_core::AppConfig) -> Result<ServiceDeps> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    let http_client = reqwest::Client::new();
    let ai = Arc::new(ai_client::OpenAi::new(config.openai_api_key.clone()));
    let ai_rate_limiter = Arc::new(keepwell_core::rate_limit::ai_rate_limiter(
        config.ai_requests_per_second,
    ));

    let embedding_service = Arc::new(OpenAiEmbeddingService {
        ai: ai.clone(),
        model: config.embedding_model.clone(),
    });

    let vector_client = vector_index_client::VectorIndexClient::new(
        &config.qdrant_url,
        config.qdrant_api_key.as_deref(),
    );
    vector_client.ensure_collection().await?;
    let vector_index = Arc::new(QdrantVectorIndex {
        client: vector_client,
    });

    let ingestor = Arc::new(HttpIngestor::new(http_client.clone()));

    Ok(ServiceDeps {
        db_pool: pool,
        http_client,
        ai,
        ai_rate_limiter,
        embedding_service,
        vector_index,
        ingestor,
        config,
    })
}
