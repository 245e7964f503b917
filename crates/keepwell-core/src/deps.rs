use std::sync::Arc;

use ai_client::OpenAi;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::ingestor::Ingestor;
use crate::rate_limit::AiRateLimiter;
use crate::vector::{EmbeddingService, VectorIndex};

/// Shared dependency container threaded through the save service, content
/// pipeline, clustering engine, and retrieval service.
///
/// Concrete adapters (Postgres pool, AI client, vector index, ingestors) are
/// constructed once at process startup in `keepwell-server`/`keepwell-worker`
/// and cloned cheaply via the `Arc`s here.
#[derive(Clone)]
pub struct ServiceDeps {
    pub db_pool: PgPool,
    pub http_client: reqwest::Client,
    pub ai: Arc<OpenAi>,
    pub ai_rate_limiter: Arc<AiRateLimiter>,
    pub embedding_service: Arc<dyn EmbeddingService>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub ingestor: Arc<dyn Ingestor>,
    pub config: AppConfig,
}
