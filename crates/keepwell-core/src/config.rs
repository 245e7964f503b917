use anyhow::Result;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Server
    pub port: u16,

    // Auth
    pub jwt_secret: String,
    pub jwt_expiry_seconds: i64,
    pub allowed_origins: Vec<String>,

    // AI / LLM
    pub openai_api_key: String,
    pub embedding_model: String,
    pub classification_model: String,
    pub ai_requests_per_second: u32,

    // AWS / SQS
    pub aws_region: String,
    pub sqs_content_queue_url: String,
    pub sqs_clustering_queue_url: String,

    // Vector index
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,

    // Cache (optional, unused by the core pipeline)
    pub redis_url: Option<String>,

    // Clustering thresholds
    pub min_cluster_size: usize,
    pub min_items_for_clustering: usize,
    pub cluster_batch_size: i64,
    pub auto_cluster_on_ingest: bool,

    // Pipeline retry policy
    pub max_stage_attempts: u32,
    pub queue_visibility_timeout_secs: i32,
    pub queue_wait_time_secs: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: std::env::var("JWT_SECRET")?,
            jwt_expiry_seconds: std::env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .unwrap_or(604_800),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
            openai_api_key: std::env::var("OPENAI_API_KEY")?,
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            classification_model: std::env::var("CLASSIFICATION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ai_requests_per_second: std::env::var("AI_REQUESTS_PER_SECOND")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            sqs_content_queue_url: std::env::var("SQS_CONTENT_QUEUE_URL")?,
            sqs_clustering_queue_url: std::env::var("SQS_CLUSTERING_QUEUE_URL")?,
            qdrant_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6333".to_string()),
            qdrant_api_key: std::env::var("QDRANT_API_KEY").ok(),
            redis_url: std::env::var("REDIS_URL").ok(),
            min_cluster_size: std::env::var("MIN_CLUSTER_SIZE")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            min_items_for_clustering: std::env::var("MIN_ITEMS_FOR_CLUSTERING")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            cluster_batch_size: std::env::var("CLUSTER_BATCH_SIZE")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(200),
            auto_cluster_on_ingest: std::env::var("AUTO_CLUSTER_ON_INGEST")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            max_stage_attempts: std::env::var("MAX_STAGE_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            queue_visibility_timeout_secs: std::env::var("QUEUE_VISIBILITY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            queue_wait_time_secs: std::env::var("QUEUE_WAIT_TIME_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
        })
    }
}
