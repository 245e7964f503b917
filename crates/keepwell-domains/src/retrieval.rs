use std::collections::HashMap;

use keepwell_core::enums::{ContentCategory, ItemStatus};
use keepwell_core::error::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Cluster, ClusterMembership, SharedContent, UserContentSave};

pub struct ListFilters {
    pub category: Option<ContentCategory>,
    pub status: Option<ItemStatus>,
    pub include_archived: bool,
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
}

/// Read-only operations consumed by the HTTP layer: list/get/update/delete
/// saves and list/get/delete clusters, all ownership-checked.
pub struct RetrievalService {
    pool: PgPool,
}

impl RetrievalService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_saves(
        &self,
        user_id: Uuid,
        filters: ListFilters,
        page: i64,
        page_size: i64,
    ) -> CoreResult<Page<(UserContentSave, SharedContent)>> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let saves = sqlx::query_as::<_, UserContentSave>(
            r#"
            SELECT ucs.* FROM user_content_saves ucs
            JOIN shared_content sc ON sc.id = ucs.shared_content_id
            WHERE ucs.user_id = $1
              AND ($2::content_category IS NULL OR sc.content_category = $2)
              AND ($3::item_status IS NULL OR sc.status = $3)
              AND (ucs.is_archived = false OR $4 = true)
            ORDER BY ucs.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(user_id)
        .bind(filters.category)
        .bind(filters.status)
        .bind(filters.include_archived)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(saves.len());
        for save in saves {
            let content = SharedContent::find_by_id(save.shared_content_id, &self.pool).await?;
            items.push((save, content));
        }

        Ok(Page {
            items,
            page,
            page_size,
        })
    }

    /// Map of category -> non-archived save count for a user.
    pub async fn category_counts(&self, user_id: Uuid) -> CoreResult<HashMap<ContentCategory, i64>> {
        let rows: Vec<(ContentCategory, i64)> = sqlx::query_as(
            r#"
            SELECT sc.content_category, COUNT(*)
            FROM user_content_saves ucs
            JOIN shared_content sc ON sc.id = ucs.shared_content_id
            WHERE ucs.user_id = $1 AND ucs.is_archived = false AND sc.content_category IS NOT NULL
            GROUP BY sc.content_category
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn get_save(&self, user_id: Uuid, save_id: Uuid) -> CoreResult<(UserContentSave, SharedContent)> {
        let save = UserContentSave::find_by_id(save_id, &self.pool).await?;
        self.check_save_ownership(&save, user_id)?;
        let content = SharedContent::find_by_id(save.shared_content_id, &self.pool).await?;
        Ok((save, content))
    }

    pub async fn update_save(
        &self,
        user_id: Uuid,
        save_id: Uuid,
        note: Option<&str>,
        is_favorited: Option<bool>,
        is_archived: Option<bool>,
    ) -> CoreResult<UserContentSave> {
        let existing = UserContentSave::find_by_id(save_id, &self.pool).await?;
        self.check_save_ownership(&existing, user_id)?;
        UserContentSave::update_flags(save_id, note, is_favorited, is_archived, &self.pool).await
    }

    pub async fn delete_save(&self, user_id: Uuid, save_id: Uuid) -> CoreResult<()> {
        let existing = UserContentSave::find_by_id(save_id, &self.pool).await?;
        self.check_save_ownership(&existing, user_id)?;

        UserContentSave::delete(save_id, &self.pool).await?;
        SharedContent::decrement_save_count(existing.shared_content_id, &self.pool).await?;
        Ok(())
    }

    pub async fn list_clusters(
        &self,
        user_id: Uuid,
        category: Option<ContentCategory>,
    ) -> CoreResult<Vec<(Cluster, i64)>> {
        let clusters = Cluster::list_for_user(user_id, category, &self.pool).await?;
        let mut out = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let count = ClusterMembership::count_for_cluster(cluster.id, &self.pool).await?;
            out.push((cluster, count));
        }
        Ok(out)
    }

    pub async fn get_cluster_with_items(
        &self,
        user_id: Uuid,
        cluster_id: Uuid,
    ) -> CoreResult<(Cluster, Vec<(UserContentSave, SharedContent)>)> {
        let cluster = Cluster::find_by_id(cluster_id, &self.pool).await?;
        if cluster.user_id != user_id {
            return Err(CoreError::NotFound("cluster not found".to_string()));
        }

        let memberships = ClusterMembership::list_for_cluster(cluster_id, &self.pool).await?;
        let mut items = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let save = UserContentSave::find_by_id(membership.save_id, &self.pool).await?;
            let content = SharedContent::find_by_id(save.shared_content_id, &self.pool).await?;
            items.push((save, content));
        }
        Ok((cluster, items))
    }

    pub async fn delete_cluster(&self, user_id: Uuid, cluster_id: Uuid) -> CoreResult<()> {
        let cluster = Cluster::find_by_id(cluster_id, &self.pool).await?;
        if cluster.user_id != user_id {
            return Err(CoreError::NotFound("cluster not found".to_string()));
        }
        Cluster::delete(cluster_id, &self.pool).await
    }

    fn check_save_ownership(&self, save: &UserContentSave, user_id: Uuid) -> CoreResult<()> {
        if save.user_id != user_id {
            return Err(CoreError::NotFound("save not found".to_string()));
        }
        Ok(())
    }
}
