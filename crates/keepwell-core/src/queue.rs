use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::ContentCategory;
use crate::error::CoreResult;

/// Message body for the content-processing queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "job_type", rename_all = "snake_case")]
pub enum ContentJobMessage {
    IngestContent {
        shared_content_id: Uuid,
        url: String,
    },
}

/// Message body for the clustering queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "job_type", rename_all = "snake_case")]
pub enum ClusteringJobMessage {
    ClusterUser {
        user_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        content_category: Option<ContentCategory>,
    },
}

/// A message received from a queue, carrying the opaque handle needed to
/// delete or extend its visibility.
#[derive(Debug, Clone)]
pub struct ReceivedMessage<T> {
    pub receipt_handle: String,
    pub body: T,
}

/// Narrow queue seam covering only what the workers need: long-poll
/// receive, delete-on-success, and visibility extension for long jobs.
/// Enqueueing is modeled separately per queue (see `sqs-client`) since the
/// send side is typed per message kind rather than generic.
#[async_trait]
pub trait JobQueue<T>: Send + Sync
where
    T: for<'de> Deserialize<'de> + Send,
{
    async fn receive(&self, max_messages: i32) -> CoreResult<Vec<ReceivedMessage<T>>>;
    async fn delete(&self, receipt_handle: &str) -> CoreResult<()>;
    async fn extend_visibility(&self, receipt_handle: &str, secs: i32) -> CoreResult<()>;
}
