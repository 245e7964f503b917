use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct VectorParams {
    pub size: u32,
    pub distance: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateCollectionRequest {
    pub vectors: VectorParams,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PointStruct {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpsertRequest {
    pub points: Vec<PointStruct>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub match_value: MatchValue,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MatchValue {
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Filter {
    pub must: Vec<FieldCondition>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchRequest {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    pub result: Vec<ScoredPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScoredPoint {
    pub id: Value,
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RetrieveRequest {
    pub ids: Vec<String>,
    pub with_vector: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RetrieveResponse {
    pub result: Vec<RetrievedPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RetrievedPoint {
    pub id: Value,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DeleteRequest {
    pub points: Vec<String>,
}
