use std::sync::Arc;

use async_trait::async_trait;
use keepwell_core::enums::ContentCategory;
use keepwell_core::error::{CoreError, CoreResult};
use keepwell_core::vector::{EmbeddingService, VectorIndex, VectorMatch, VectorPayload};
use uuid::Uuid;

/// Wrapper to make `OpenAi` implement our dyn-compatible `EmbeddingService` trait.
pub struct OpenAiEmbeddingService {
    pub ai: Arc<ai_client::OpenAi>,
    pub model: String,
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingService {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        self.ai
            .create_embedding(text, &self.model)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        self.ai
            .create_embeddings_batch(texts, &self.model)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }
}

/// Wrapper over `vector_index_client::VectorIndexClient` translating the
/// typed `VectorPayload` to/from the client's untyped JSON payload.
pub struct QdrantVectorIndex {
    pub client: vector_index_client::VectorIndexClient,
}

impl QdrantVectorIndex {
    fn to_match(m: vector_index_client::VectorMatch) -> Option<VectorMatch> {
        let payload: VectorPayload = serde_json::from_value(m.payload).ok()?;
        Some(VectorMatch {
            id: m.id,
            score: m.score,
            payload,
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: VectorPayload) -> CoreResult<()> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| CoreError::Internal(format!("vector payload serialization failed: {e}")))?;
        self.client
            .upsert(id, vector, payload)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }

    async fn upsert_batch(&self, points: Vec<(Uuid, Vec<f32>, VectorPayload)>) -> CoreResult<()> {
        let mut translated = Vec::with_capacity(points.len());
        for (id, vector, payload) in points {
            let payload = serde_json::to_value(payload).map_err(|e| {
                CoreError::Internal(format!("vector payload serialization failed: {e}"))
            })?;
            translated.push((id, vector, payload));
        }
        self.client
            .upsert_batch(translated)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }

    async fn fetch_vectors(&self, ids: &[Uuid]) -> CoreResult<Vec<(Uuid, Vec<f32>)>> {
        self.client
            .fetch_vectors(ids)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        category: Option<ContentCategory>,
    ) -> CoreResult<Vec<VectorMatch>> {
        let filter = category
            .map(|c| serde_json::to_value(c))
            .transpose()
            .map_err(|e| CoreError::Internal(format!("category filter serialization failed: {e}")))?
            .map(|value| ("content_category", value));

        let matches = self
            .client
            .search(vector, limit, filter)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))?;

        Ok(matches.into_iter().filter_map(Self::to_match).collect())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        self.client
            .delete(id)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))
    }
}
