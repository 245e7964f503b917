use chrono::{DateTime, Utc};
use keepwell_core::enums::{ContentCategory, ContentIntent, ItemStatus, SourcePlatform};
use keepwell_core::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Canonical, deduplicated metadata for one unique URL, shared across every
/// user who saves it. `content_category` is assigned once, at the first
/// transition to READY, and is immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SharedContent {
    pub id: Uuid,
    pub url: String,
    pub url_hash: String,
    pub source_platform: SourcePlatform,
    pub status: ItemStatus,
    pub content_category: Option<ContentCategory>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub content_text: Option<String>,
    pub topic_main: Option<String>,
    pub subcategories: serde_json::Value,
    pub locations: serde_json::Value,
    pub entities: serde_json::Value,
    pub intent: Option<ContentIntent>,
    pub visual_description: Option<String>,
    pub visual_tags: serde_json::Value,
    pub embedding_id: Option<Uuid>,
    pub save_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SharedContent {
    pub async fn create_pending(
        url: &str,
        url_hash: &str,
        source_platform: SourcePlatform,
        pool: &PgPool,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO shared_content (url, url_hash, source_platform, status, save_count)
            VALUES ($1, $2, $3, 'PENDING', 1)
            RETURNING *
            "#,
        )
        .bind(url)
        .bind(url_hash)
        .bind(source_platform)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM shared_content WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_url_hash(url_hash: &str, pool: &PgPool) -> CoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM shared_content WHERE url_hash = $1")
            .bind(url_hash)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Lock the row for the duration of the caller's transaction. Used by
    /// the pipeline to serialise status transitions on a single id.
    pub async fn find_by_id_for_update(
        id: Uuid,
        tx: &mut sqlx::PgConnection,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM shared_content WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Into::into)
    }

    pub async fn increment_save_count(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query("UPDATE shared_content SET save_count = save_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn decrement_save_count(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query(
            "UPDATE shared_content SET save_count = GREATEST(save_count - 1, 0) WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_processing(id: Uuid, tx: &mut sqlx::PgConnection) -> CoreResult<()> {
        sqlx::query(
            "UPDATE shared_content SET status = 'PROCESSING', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        Ok(())
    }

    /// Apply the full set of pipeline-derived fields and transition to READY.
    /// Guarded on `status = 'PROCESSING'` so a redelivered worker that lost
    /// the race to an earlier run (already READY) cannot regress or
    /// overwrite the authoritative classification. Returns whether this
    /// call actually performed the transition.
    #[allow(clippy::too_many_arguments)]
    pub async fn mark_ready(
        id: Uuid,
        title: Option<&str>,
        caption: Option<&str>,
        description: Option<&str>,
        thumbnail_url: Option<&str>,
        duration_seconds: Option<i32>,
        content_text: Option<&str>,
        topic_main: Option<&str>,
        content_category: ContentCategory,
        subcategories: &serde_json::Value,
        locations: &serde_json::Value,
        entities: &serde_json::Value,
        intent: Option<ContentIntent>,
        visual_description: Option<&str>,
        visual_tags: &serde_json::Value,
        embedding_id: Uuid,
        pool: &PgPool,
    ) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE shared_content
            SET title = $2, caption = $3, description = $4, thumbnail_url = $5,
                duration_seconds = $6, content_text = $7, topic_main = $8,
                content_category = $9, subcategories = $10, locations = $11,
                entities = $12, intent = $13, visual_description = $14,
                visual_tags = $15, embedding_id = $16, status = 'READY',
                updated_at = now()
            WHERE id = $1 AND status = 'PROCESSING'
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(caption)
        .bind(description)
        .bind(thumbnail_url)
        .bind(duration_seconds)
        .bind(content_text)
        .bind(topic_main)
        .bind(content_category)
        .bind(subcategories)
        .bind(locations)
        .bind(entities)
        .bind(intent)
        .bind(visual_description)
        .bind(visual_tags)
        .bind(embedding_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Terminal transition after stage retries are exhausted. Guarded the
    /// same way as `mark_ready` so it can't clobber a row a concurrent
    /// redelivery already carried to READY.
    pub async fn mark_failed(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query(
            "UPDATE shared_content SET status = 'FAILED', updated_at = now() \
             WHERE id = $1 AND status = 'PROCESSING'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reset a FAILED row back to PENDING ahead of an operator-triggered
    /// re-enqueue. No-op (returns the row unchanged) for any other status,
    /// since only FAILED content is eligible for retry.
    pub async fn reset_to_pending_if_failed(id: Uuid, pool: &PgPool) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE shared_content
            SET status = 'PENDING', updated_at = now()
            WHERE id = $1 AND status = 'FAILED'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::Conflict("NotFailed".to_string()))
    }
}
