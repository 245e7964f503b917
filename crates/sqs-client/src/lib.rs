pub mod error;

pub use error::{Result, SqsClientError};

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use keepwell_core::error::CoreError;
use keepwell_core::queue::{ClusteringJobMessage, ContentJobMessage, JobQueue, ReceivedMessage};
use serde::de::DeserializeOwned;
use uuid::Uuid;

impl From<SqsClientError> for CoreError {
    fn from(err: SqsClientError) -> Self {
        CoreError::UnavailableExternal(err.to_string())
    }
}

/// Adapter over AWS SQS for the content-processing and clustering queues.
pub struct SqsClient {
    client: Client,
    content_queue_url: String,
    clustering_queue_url: String,
    wait_time_secs: i32,
    visibility_timeout_secs: i32,
}

impl SqsClient {
    pub async fn from_env(
        content_queue_url: String,
        clustering_queue_url: String,
        wait_time_secs: i32,
        visibility_timeout_secs: i32,
    ) -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: Client::new(&config),
            content_queue_url,
            clustering_queue_url,
            wait_time_secs,
            visibility_timeout_secs,
        }
    }

    pub async fn send_content_processing_job(
        &self,
        shared_content_id: Uuid,
        url: &str,
    ) -> Result<()> {
        let message = ContentJobMessage::IngestContent {
            shared_content_id,
            url: url.to_string(),
        };
        self.send(&self.content_queue_url, &message).await
    }

    pub async fn send_clustering_job(
        &self,
        user_id: Uuid,
        content_category: Option<keepwell_core::enums::ContentCategory>,
    ) -> Result<()> {
        let message = ClusteringJobMessage::ClusterUser {
            user_id,
            content_category,
        };
        self.send(&self.clustering_queue_url, &message).await
    }

    async fn send<T: serde::Serialize>(&self, queue_url: &str, body: &T) -> Result<()> {
        let message_body = serde_json::to_string(body)
            .map_err(|e| SqsClientError::MalformedBody(e.to_string()))?;

        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| SqsClientError::Aws(e.to_string()))?;

        Ok(())
    }

    async fn receive<T: DeserializeOwned>(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_time_secs: i32,
        visibility_timeout_secs: i32,
    ) -> Result<Vec<ReceivedMessage<T>>> {
        let response = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages.clamp(1, 10))
            .wait_time_seconds(wait_time_secs)
            .visibility_timeout(visibility_timeout_secs)
            .send()
            .await
            .map_err(|e| SqsClientError::Aws(e.to_string()))?;

        let mut out = Vec::new();
        for msg in response.messages.unwrap_or_default() {
            let (Some(body), Some(receipt_handle)) = (msg.body, msg.receipt_handle) else {
                continue;
            };
            match serde_json::from_str::<T>(&body) {
                Ok(parsed) => out.push(ReceivedMessage {
                    receipt_handle,
                    body: parsed,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed queue message");
                }
            }
        }
        Ok(out)
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| SqsClientError::Aws(e.to_string()))?;
        Ok(())
    }

    async fn change_message_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility_timeout_secs: i32,
    ) -> Result<()> {
        self.client
            .change_message_visibility()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .visibility_timeout(visibility_timeout_secs)
            .send()
            .await
            .map_err(|e| SqsClientError::Aws(e.to_string()))?;
        Ok(())
    }
}

/// `JobQueue` binding over the content-processing queue.
pub struct ContentJobQueue(pub Arc<SqsClient>);

#[async_trait]
impl JobQueue<ContentJobMessage> for ContentJobQueue {
    async fn receive(
        &self,
        max_messages: i32,
    ) -> keepwell_core::error::CoreResult<Vec<ReceivedMessage<ContentJobMessage>>> {
        Ok(self
            .0
            .receive(
                &self.0.content_queue_url,
                max_messages,
                self.0.wait_time_secs,
                self.0.visibility_timeout_secs,
            )
            .await?)
    }

    async fn delete(&self, receipt_handle: &str) -> keepwell_core::error::CoreResult<()> {
        Ok(self
            .0
            .delete_message(&self.0.content_queue_url, receipt_handle)
            .await?)
    }

    async fn extend_visibility(
        &self,
        receipt_handle: &str,
        secs: i32,
    ) -> keepwell_core::error::CoreResult<()> {
        Ok(self
            .0
            .change_message_visibility(&self.0.content_queue_url, receipt_handle, secs)
            .await?)
    }
}

/// `JobQueue` binding over the clustering queue.
pub struct ClusteringJobQueue(pub Arc<SqsClient>);

#[async_trait]
impl JobQueue<ClusteringJobMessage> for ClusteringJobQueue {
    async fn receive(
        &self,
        max_messages: i32,
    ) -> keepwell_core::error::CoreResult<Vec<ReceivedMessage<ClusteringJobMessage>>> {
        Ok(self
            .0
            .receive(
                &self.0.clustering_queue_url,
                max_messages,
                self.0.wait_time_secs,
                self.0.visibility_timeout_secs,
            )
            .await?)
    }

    async fn delete(&self, receipt_handle: &str) -> keepwell_core::error::CoreResult<()> {
        Ok(self
            .0
            .delete_message(&self.0.clustering_queue_url, receipt_handle)
            .await?)
    }

    async fn extend_visibility(
        &self,
        receipt_handle: &str,
        secs: i32,
    ) -> keepwell_core::error::CoreResult<()> {
        Ok(self
            .0
            .change_message_visibility(&self.0.clustering_queue_url, receipt_handle, secs)
            .await?)
    }
}
