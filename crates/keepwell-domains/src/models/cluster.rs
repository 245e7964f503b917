use chrono::{DateTime, Utc};
use keepwell_core::enums::ContentCategory;
use keepwell_core::error::CoreResult;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// A per-user, per-category group of similar saves with an AI-generated
/// (or rule-based fallback) label.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cluster {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_category: ContentCategory,
    pub label: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Cluster {
    pub async fn create_in_tx(
        user_id: Uuid,
        content_category: ContentCategory,
        label: &str,
        description: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO clusters (user_id, content_category, label, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(content_category)
        .bind(label)
        .bind(description)
        .fetch_one(&mut **tx)
        .await
        .map_err(Into::into)
    }

    /// Delete every cluster for (user, category); memberships cascade.
    pub async fn delete_for_user_category_in_tx(
        user_id: Uuid,
        content_category: ContentCategory,
        tx: &mut Transaction<'_, Postgres>,
    ) -> CoreResult<()> {
        sqlx::query("DELETE FROM clusters WHERE user_id = $1 AND content_category = $2")
            .bind(user_id)
            .bind(content_category)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> CoreResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM clusters WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn list_for_user(
        user_id: Uuid,
        category: Option<ContentCategory>,
        pool: &PgPool,
    ) -> CoreResult<Vec<Self>> {
        match category {
            Some(category) => sqlx::query_as::<_, Self>(
                "SELECT * FROM clusters WHERE user_id = $1 AND content_category = $2 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .bind(category)
            .fetch_all(pool)
            .await
            .map_err(Into::into),
            None => sqlx::query_as::<_, Self>(
                "SELECT * FROM clusters WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into),
        }
    }

    pub async fn delete(id: Uuid, pool: &PgPool) -> CoreResult<()> {
        sqlx::query("DELETE FROM clusters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
