use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ContentCategory, SourcePlatform};
use crate::error::CoreResult;

/// Filterable payload stored alongside each vector point.
///
/// Mirrors the columns the clustering engine and retrieval service actually
/// filter on; it is not a copy of the full `SharedContent` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPayload {
    pub content_category: Option<ContentCategory>,
    pub source_platform: SourcePlatform,
}

#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: Uuid,
    pub score: f32,
    pub payload: VectorPayload,
}

/// Client seam over the external vector index.
///
/// Points are keyed by `SharedContent.id` by convention, so `embedding_id`
/// on the row and the point id in the index are always the same UUID.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: VectorPayload) -> CoreResult<()>;

    async fn upsert_batch(
        &self,
        points: Vec<(Uuid, Vec<f32>, VectorPayload)>,
    ) -> CoreResult<()>;

    async fn fetch_vectors(&self, ids: &[Uuid]) -> CoreResult<Vec<(Uuid, Vec<f32>)>>;

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        category: Option<ContentCategory>,
    ) -> CoreResult<Vec<VectorMatch>>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}

/// Embedding generation seam, kept separate from `VectorIndex` so the
/// pipeline can depend on just the piece it needs at each stage.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;
}
