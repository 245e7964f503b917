mod classification;

pub use classification::ClassificationResult;

use std::sync::Arc;

use keepwell_core::deps::ServiceDeps;
use keepwell_core::enums::ItemStatus;
use keepwell_core::error::{CoreError, CoreResult};
use keepwell_core::vector::VectorPayload;
use sqs_client::SqsClient;
use uuid::Uuid;

use crate::models::{ProcessingJob, SharedContent, UserContentSave};

/// Build the deterministic `content_text` from whatever the ingestor could
/// fetch. Order is fixed so the same raw page always yields the same text.
fn build_content_text(
    title: Option<&str>,
    caption: Option<&str>,
    description: Option<&str>,
    transcript: Option<&str>,
) -> Option<String> {
    let parts: Vec<&str> = [title, caption, description, transcript]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Build the text handed to the embedding provider: topic, title if
/// distinct from topic, the category tag, up to 5 subcategories, up to 3
/// locations. Falls back to the caption or the URL itself only when topic,
/// title, subcategories, and locations are all empty.
fn build_embedding_text(
    topic_main: &str,
    title: Option<&str>,
    category: &str,
    subcategories: &[String],
    locations: &[String],
    caption: Option<&str>,
    url: &str,
) -> String {
    let mut descriptive = Vec::new();
    if !topic_main.is_empty() {
        descriptive.push(topic_main.to_string());
    }
    if let Some(title) = title {
        if title != topic_main && !title.is_empty() {
            descriptive.push(title.to_string());
        }
    }

    let tags: Vec<String> = subcategories
        .iter()
        .take(5)
        .chain(locations.iter().take(3))
        .cloned()
        .collect();

    // Fall back only when there's nothing descriptive at all — the category
    // tag alone is never enough to call this a meaningful embedding input.
    if descriptive.is_empty() && tags.is_empty() {
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            descriptive.push(caption.to_string());
        } else {
            descriptive.push(url.to_string());
        }
    }

    let mut parts = descriptive;
    parts.push(category.to_string());
    parts.extend(tags);
    parts.join(" | ")
}

/// Run the full ingest -> enrich -> analyse -> vectorise pipeline for one
/// content-processing job. Idempotent: re-entering with a row already in
/// PROCESSING (e.g. after a crash and queue redelivery) just re-runs the
/// stages and ends at the same READY state.
pub async fn process_content_job(
    deps: &ServiceDeps,
    queue: &Arc<SqsClient>,
    job_id: Uuid,
    shared_content_id: Uuid,
    url: &str,
) -> CoreResult<()> {
    ProcessingJob::mark_running(job_id, &deps.db_pool).await?;

    let result = run_stages(deps, queue, shared_content_id, url).await;

    match result {
        Ok(()) => {
            ProcessingJob::mark_completed(job_id, &deps.db_pool).await?;
            Ok(())
        }
        Err(e) => {
            ProcessingJob::mark_failed(job_id, &e.to_string(), &deps.db_pool).await?;

            let attempts = ProcessingJob::count_for_content(shared_content_id, &deps.db_pool).await?;
            if attempts >= deps.config.max_stage_attempts as i64 {
                tracing::error!(
                    %shared_content_id, attempts, error = %e,
                    "stage retries exhausted, transitioning to FAILED"
                );
                SharedContent::mark_failed(shared_content_id, &deps.db_pool).await?;
                // Terminal: the queue message must be deleted rather than
                // redelivered, so report success to the caller.
                return Ok(());
            }

            Err(e)
        }
    }
}

async fn run_stages(
    deps: &ServiceDeps,
    queue: &Arc<SqsClient>,
    shared_content_id: Uuid,
    url: &str,
) -> CoreResult<()> {
    {
        let mut tx = deps.db_pool.begin().await?;
        let content = SharedContent::find_by_id_for_update(shared_content_id, &mut tx).await?;
        if content.status == ItemStatus::Ready {
            // Already converged; at-least-once redelivery landed after a
            // prior successful run. Nothing left to do.
            tx.commit().await?;
            return Ok(());
        }
        SharedContent::mark_processing(shared_content_id, &mut tx).await?;
        tx.commit().await?;
    }

    // Stage 1: ingestion.
    let raw = deps.ingestor.fetch_metadata(url).await?;

    // Stage 2: enrichment.
    let content_text = build_content_text(
        raw.title.as_deref(),
        raw.caption.as_deref(),
        raw.description.as_deref(),
        None,
    );
    let text_for_classification = content_text.clone().unwrap_or_else(|| url.to_string());

    // Stage 3: analysis / classification, with one retry on a malformed
    // or out-of-enum response.
    let mut classification = classify_with_retry(deps, &text_for_classification).await?;
    dedup_preserve_order(&mut classification.subcategories);
    dedup_preserve_order(&mut classification.locations);
    dedup_preserve_order(&mut classification.entities);
    dedup_preserve_order(&mut classification.visual_tags);

    // Stage 4: vectorisation.
    let embedding_text = build_embedding_text(
        &classification.topic_main,
        raw.title.as_deref(),
        &classification.content_category.to_string(),
        &classification.subcategories,
        &classification.locations,
        raw.caption.as_deref(),
        url,
    );
    deps.ai_rate_limiter.until_ready().await;
    let vector = deps.embedding_service.embed(&embedding_text).await?;

    let embedding_id = shared_content_id;
    deps.vector_index
        .upsert(
            embedding_id,
            vector,
            VectorPayload {
                content_category: Some(classification.content_category),
                source_platform: keepwell_core::enums::SourcePlatform::detect(
                    &url::Url::parse(url)
                        .map_err(|e| CoreError::Validation(format!("invalid URL: {e}")))?,
                ),
            },
        )
        .await?;

    let transitioned = SharedContent::mark_ready(
        shared_content_id,
        raw.title.as_deref(),
        raw.caption.as_deref(),
        raw.description.as_deref(),
        raw.thumbnail_url.as_deref(),
        raw.duration_seconds,
        content_text.as_deref(),
        Some(&classification.topic_main),
        classification.content_category,
        &serde_json::json!(classification.subcategories),
        &serde_json::json!(classification.locations),
        &serde_json::json!(classification.entities),
        classification.intent,
        classification.visual_description.as_deref(),
        &serde_json::json!(classification.visual_tags),
        embedding_id,
        &deps.db_pool,
    )
    .await?;

    // A concurrent redelivery already carried this row to READY (or FAILED)
    // first; this run's classification loses, and auto-clustering was
    // already enqueued by whichever run actually won.
    if transitioned && deps.config.auto_cluster_on_ingest {
        enqueue_auto_cluster(deps, queue, shared_content_id, classification.content_category).await?;
    }

    Ok(())
}

/// Fan out a clustering job to every user holding a save of this content, now
/// that it has a category and a vector. Best-effort per user: one user's
/// queue failure doesn't roll back the others or the ingest itself.
async fn enqueue_auto_cluster(
    deps: &ServiceDeps,
    queue: &Arc<SqsClient>,
    shared_content_id: Uuid,
    category: keepwell_core::enums::ContentCategory,
) -> CoreResult<()> {
    let user_ids = UserContentSave::user_ids_for_content(shared_content_id, &deps.db_pool).await?;
    for user_id in user_ids {
        if let Err(e) = queue.send_clustering_job(user_id, Some(category)).await {
            tracing::warn!(%user_id, %shared_content_id, error = %e, "failed to enqueue auto-cluster job");
        }
    }
    Ok(())
}

async fn classify_with_retry(
    deps: &ServiceDeps,
    text: &str,
) -> CoreResult<ClassificationResult> {
    let user_prompt = classification::build_user_prompt(text);

    deps.ai_rate_limiter.until_ready().await;
    let first = deps
        .ai
        .extract::<ClassificationResult>(
            &deps.config.classification_model,
            classification::CLASSIFICATION_SYSTEM_PROMPT,
            user_prompt.clone(),
        )
        .await;

    match first {
        Ok(result) => Ok(result),
        Err(e) => {
            if is_rate_limit(&e) {
                return Err(e.into());
            }
            deps.ai_rate_limiter.until_ready().await;
            deps.ai
                .extract::<ClassificationResult>(
                    &deps.config.classification_model,
                    classification::CLASSIFICATION_SYSTEM_PROMPT,
                    user_prompt,
                )
                .await
                .map_err(|_| {
                    CoreError::Internal(format!(
                        "classification failed twice, last error: {e}"
                    ))
                })
        }
    }
}

fn is_rate_limit(e: &ai_client::AiError) -> bool {
    matches!(e, ai_client::AiError::RateLimited { .. })
}

/// Drop repeats while keeping first-seen order, for the LLM's own
/// subcategory/location/entity/visual-tag lists.
fn dedup_preserve_order(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(values.len());
    values.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_text_joins_available_fields_in_fixed_order() {
        let text = build_content_text(Some("Title"), Some("Caption"), None, None).unwrap();
        assert_eq!(text, "Title\n\nCaption");
    }

    #[test]
    fn content_text_is_none_when_nothing_available() {
        assert!(build_content_text(None, None, None, None).is_none());
    }

    #[test]
    fn embedding_text_falls_back_to_url_when_nothing_else_available() {
        let text = build_embedding_text("", None, "Misc", &[], &[], None, "https://example.com/x");
        assert!(text.contains("https://example.com/x"));
    }

    #[test]
    fn embedding_text_skips_duplicate_title() {
        let text = build_embedding_text(
            "Ramen",
            Some("Ramen"),
            "Food",
            &["noodles".to_string()],
            &[],
            None,
            "https://example.com",
        );
        assert_eq!(text, "Ramen | Food | noodles");
    }

    #[test]
    fn dedup_preserve_order_drops_repeats_keeping_first_occurrence() {
        let mut values = vec!["Tokyo".to_string(), "Kyoto".to_string(), "Tokyo".to_string()];
        dedup_preserve_order(&mut values);
        assert_eq!(values, vec!["Tokyo".to_string(), "Kyoto".to_string()]);
    }
}
