use chrono::{DateTime, Utc};
use keepwell_core::error::CoreResult;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// The many-to-many link between a Cluster and a UserContentSave.
/// Composite identity (`cluster_id`, `save_id`); cascades on either parent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClusterMembership {
    pub cluster_id: Uuid,
    pub save_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ClusterMembership {
    pub async fn create_in_tx(
        cluster_id: Uuid,
        save_id: Uuid,
        tx: &mut Transaction<'_, Postgres>,
    ) -> CoreResult<()> {
        sqlx::query("INSERT INTO cluster_memberships (cluster_id, save_id) VALUES ($1, $2)")
            .bind(cluster_id)
            .bind(save_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn list_for_cluster(
        cluster_id: Uuid,
        pool: &sqlx::PgPool,
    ) -> CoreResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM cluster_memberships WHERE cluster_id = $1")
            .bind(cluster_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn count_for_cluster(cluster_id: Uuid, pool: &sqlx::PgPool) -> CoreResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cluster_memberships WHERE cluster_id = $1")
                .bind(cluster_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
