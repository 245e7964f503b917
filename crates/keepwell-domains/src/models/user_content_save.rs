use chrono::{DateTime, Utc};
use keepwell_core::error::CoreResult;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// One user's private pointer to a `SharedContent`, plus annotations.
/// Unique on (`user_id`, `shared_content_id`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserContentSave {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shared_content_id: Uuid,
    pub note: Option<String>,
    pub is_favorited: bool,
    pub is_archived: bool,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserContentSave {
    pub async fn create_in_tx(
        user_id: Uuid,
        shared_content_id: Uuid,
        note: Option<&str>,
        tx: &mut Transaction<'_, Postgres>,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO user_content_saves (user_id, shared_content_id, note)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(shared_content_id)
        .bind(note)
        .fetch_one(&mut **tx)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_user_and_content(
        user_id: Uuid,
        shared_content_id: Uuid,
        pool: &PgPool,
    ) -> CoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_content_saves WHERE user_id = $1 AND shared_content_id = $2",
        )
        .bind(user_id)
        .bind(shared_content_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_content_saves WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn update_flags(
        id: Uuid,
        note: Option<&str>,
        is_favorited: Option<bool>,
        is_archived: Option<bool>,
        pool: &PgPool,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE user_content_saves
            SET note = COALESCE($2, note),
                is_favorited = COALESCE($3, is_favorited),
                is_archived = COALESCE($4, is_archived),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(note)
        .bind(is_favorited)
        .bind(is_archived)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query("DELETE FROM user_content_saves WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Distinct users who hold a save pointing at this `SharedContent`, used
    /// to fan out an auto-cluster enqueue to every owner once ingest lands.
    pub async fn user_ids_for_content(shared_content_id: Uuid, pool: &PgPool) -> CoreResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT user_id FROM user_content_saves WHERE shared_content_id = $1",
        )
        .bind(shared_content_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// READY, embedded, non-archived saves for a user in one category — the
    /// candidate set the clustering engine operates over, capped at
    /// `batch_size` so one run's distance-matrix computation stays bounded
    /// regardless of how large a single user's category has grown.
    pub async fn ready_for_clustering(
        user_id: Uuid,
        category: keepwell_core::enums::ContentCategory,
        batch_size: i64,
        pool: &PgPool,
    ) -> CoreResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT ucs.* FROM user_content_saves ucs
            JOIN shared_content sc ON sc.id = ucs.shared_content_id
            WHERE ucs.user_id = $1
              AND ucs.is_archived = false
              AND sc.status = 'READY'
              AND sc.embedding_id IS NOT NULL
              AND sc.content_category = $2
            ORDER BY ucs.id ASC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(batch_size)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
