use chrono::{DateTime, Utc};
use keepwell_core::enums::JobStatus;
use keepwell_core::error::CoreResult;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Audit trail for a content-processing attempt. Not consulted for
/// scheduling — the queue message is the source of truth for that.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProcessingJob {
    pub id: Uuid,
    pub shared_content_id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingJob {
    pub async fn create(
        shared_content_id: Uuid,
        job_type: &str,
        pool: &PgPool,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO processing_jobs (shared_content_id, job_type, status)
            VALUES ($1, $2, 'PENDING')
            RETURNING *
            "#,
        )
        .bind(shared_content_id)
        .bind(job_type)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_running(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query("UPDATE processing_jobs SET status = 'RUNNING', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_completed(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query(
            "UPDATE processing_jobs SET status = 'COMPLETED', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(id: Uuid, error_message: &str, pool: &PgPool) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE processing_jobs
            SET status = 'FAILED', error_message = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count every job ever created for this content, including the one
    /// that just failed. Each queue redelivery creates a fresh row via
    /// `create`, so this count is the attempt number for the pipeline's
    /// retry/FAILED decision.
    pub async fn count_for_content(shared_content_id: Uuid, pool: &PgPool) -> CoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM processing_jobs WHERE shared_content_id = $1",
        )
        .bind(shared_content_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
