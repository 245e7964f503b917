use std::sync::Arc;

use keepwell_core::enums::SourcePlatform;
use keepwell_core::error::{CoreError, CoreResult};
use sqlx::PgPool;
use sqs_client::SqsClient;
use uuid::Uuid;

use crate::models::{SharedContent, User, UserContentSave};
use crate::url_normalize::{normalize_url, url_hash};

pub struct SaveOutcome {
    pub save: UserContentSave,
    pub content: SharedContent,
    pub is_new_content: bool,
}

/// Transactional entry point for "user saves URL". Deduplicates on
/// `url_hash` and enqueues a content-processing job only for genuinely new
/// content, so the expensive pipeline runs at most once per canonical URL.
pub struct SaveService {
    pool: PgPool,
    queue: Arc<SqsClient>,
}

impl SaveService {
    pub fn new(pool: PgPool, queue: Arc<SqsClient>) -> Self {
        Self { pool, queue }
    }

    pub async fn save_url(
        &self,
        user_id: Uuid,
        raw_url: &str,
        note: Option<&str>,
    ) -> CoreResult<SaveOutcome> {
        // Existence check precedes User::find_by_id's own NotFound mapping:
        // a deleted/unknown user must not leave an orphan SharedContent.
        User::find_by_id(user_id, &self.pool).await?;

        let normalized = normalize_url(raw_url)?;
        let hash = url_hash(&normalized);
        let platform = SourcePlatform::detect(&normalized);

        let mut tx = self.pool.begin().await?;

        let existing = SharedContent::find_by_url_hash(&hash, &self.pool).await?;

        let (content, is_new_content) = match existing {
            Some(content) => (content, false),
            None => {
                let content = sqlx::query_as::<_, SharedContent>(
                    r#"
                    INSERT INTO shared_content (url, url_hash, source_platform, status, save_count)
                    VALUES ($1, $2, $3, 'PENDING', 0)
                    ON CONFLICT (url_hash) DO UPDATE SET url_hash = EXCLUDED.url_hash
                    RETURNING *
                    "#,
                )
                .bind(normalized.as_str())
                .bind(&hash)
                .bind(platform)
                .fetch_one(&mut *tx)
                .await?;
                // The ON CONFLICT branch only fires under a concurrent
                // first-save race; treat it the same as "found existing".
                let is_new = content.save_count == 0;
                (content, is_new)
            }
        };

        if !is_new_content {
            let already = UserContentSave::find_by_user_and_content(user_id, content.id, &self.pool)
                .await?;
            if already.is_some() {
                tx.rollback().await?;
                return Err(CoreError::Conflict("AlreadySaved".to_string()));
            }
        }

        let save = UserContentSave::create_in_tx(user_id, content.id, note, &mut tx).await?;

        sqlx::query("UPDATE shared_content SET save_count = save_count + 1 WHERE id = $1")
            .bind(content.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if is_new_content {
            self.queue
                .send_content_processing_job(content.id, normalized.as_str())
                .await
                .map_err(|e| CoreError::UnavailableExternal(e.to_string()))?;
        }

        Ok(SaveOutcome {
            save,
            content,
            is_new_content,
        })
    }

    /// Operator-triggered re-enqueue of a FAILED item. There is no
    /// automatic ageing policy that retries on its own; this is the only
    /// path back from FAILED to the pipeline.
    pub async fn retry_content(&self, shared_content_id: Uuid) -> CoreResult<SharedContent> {
        let content = SharedContent::reset_to_pending_if_failed(shared_content_id, &self.pool).await?;

        self.queue
            .send_content_processing_job(content.id, &content.url)
            .await
            .map_err(|e| CoreError::UnavailableExternal(e.to_string()))?;

        Ok(content)
    }
}
