pub mod error;
mod types;

pub use error::{Result, VectorIndexError};

use std::time::Duration;
use uuid::Uuid;

use types::{
    CreateCollectionRequest, DeleteRequest, FieldCondition, Filter, MatchValue, PointStruct,
    RetrieveRequest, RetrieveResponse, SearchRequest, SearchResponse, UpsertRequest, VectorParams,
};

const COLLECTION_NAME: &str = "shared_content";
const VECTOR_SIZE: u32 = 1536;
const UPSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: Uuid,
    pub score: f32,
    pub payload: serde_json::Value,
}

/// Thin client over a Qdrant-compatible vector index's HTTP API.
///
/// Points are keyed by `SharedContent.id`; callers never see the Qdrant
/// wire schema directly.
pub struct VectorIndexClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl VectorIndexClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            req = req.header("api-key", key);
        }
        req
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VectorIndexError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Create the collection if it does not already exist.
    pub async fn ensure_collection(&self) -> Result<()> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/collections/{COLLECTION_NAME}"))
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let body = CreateCollectionRequest {
            vectors: VectorParams {
                size: VECTOR_SIZE,
                distance: "Cosine",
            },
        };

        let resp = self
            .request(reqwest::Method::PUT, &format!("/collections/{COLLECTION_NAME}"))
            .json(&body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    pub async fn upsert(
        &self,
        id: Uuid,
        vector: Vec<f32>,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.upsert_batch(vec![(id, vector, payload)]).await
    }

    pub async fn upsert_batch(
        &self,
        points: Vec<(Uuid, Vec<f32>, serde_json::Value)>,
    ) -> Result<()> {
        for chunk in points.chunks(UPSERT_BATCH_SIZE) {
            let body = UpsertRequest {
                points: chunk
                    .iter()
                    .map(|(id, vector, payload)| PointStruct {
                        id: id.to_string(),
                        vector: vector.clone(),
                        payload: payload.clone(),
                    })
                    .collect(),
            };

            let resp = self
                .request(
                    reqwest::Method::PUT,
                    &format!("/collections/{COLLECTION_NAME}/points?wait=true"),
                )
                .json(&body)
                .send()
                .await?;
            Self::check_status(resp).await?;
        }
        Ok(())
    }

    pub async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        filter_field: Option<(&str, serde_json::Value)>,
    ) -> Result<Vec<VectorMatch>> {
        let filter = filter_field.map(|(key, value)| Filter {
            must: vec![FieldCondition {
                key: key.to_string(),
                match_value: MatchValue { value },
            }],
        });

        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
            filter,
        };

        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{COLLECTION_NAME}/points/search"),
            )
            .json(&body)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let parsed: SearchResponse = resp.json().await?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|p| {
                let id = parse_point_id(&p.id)?;
                Some(VectorMatch {
                    id,
                    score: p.score,
                    payload: p.payload,
                })
            })
            .collect())
    }

    pub async fn fetch_vectors(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Vec<f32>)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = RetrieveRequest {
            ids: ids.iter().map(Uuid::to_string).collect(),
            with_vector: true,
        };

        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{COLLECTION_NAME}/points"),
            )
            .json(&body)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let parsed: RetrieveResponse = resp.json().await?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|p| {
                let id = parse_point_id(&p.id)?;
                let vector = p.vector?;
                Some((id, vector))
            })
            .collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let body = DeleteRequest {
            points: vec![id.to_string()],
        };

        let resp = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{COLLECTION_NAME}/points/delete"),
            )
            .json(&body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

fn parse_point_id(value: &serde_json::Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = VectorIndexClient::new("http://localhost:6333/", None);
        assert_eq!(client.base_url, "http://localhost:6333");
    }

    #[test]
    fn parses_uuid_point_id() {
        let id = Uuid::new_v4();
        let value = serde_json::json!(id.to_string());
        assert_eq!(parse_point_id(&value), Some(id));
    }

    #[test]
    fn rejects_non_uuid_point_id() {
        let value = serde_json::json!("not-a-uuid");
        assert_eq!(parse_point_id(&value), None);
    }
}
