mod labelling;
mod math;

pub use labelling::ClusterLabel;
pub use math::target_cluster_count;

use keepwell_core::deps::ServiceDeps;
use keepwell_core::enums::ContentCategory;
use keepwell_core::error::CoreResult;
use uuid::Uuid;

use crate::models::{Cluster, ClusterMembership, SharedContent, UserContentSave};
use labelling::SampleMember;

/// Partition one user's READY saves in one category into fresh clusters,
/// replacing any prior clusters in that category atomically. No-op when
/// there are fewer than `MIN_ITEMS_FOR_CLUSTERING` candidates.
pub async fn cluster_user_category(
    deps: &ServiceDeps,
    user_id: Uuid,
    category: ContentCategory,
) -> CoreResult<()> {
    let saves = UserContentSave::ready_for_clustering(
        user_id,
        category,
        deps.config.cluster_batch_size,
        &deps.db_pool,
    )
    .await?;

    if saves.len() < deps.config.min_items_for_clustering {
        return Ok(());
    }

    let content_ids: Vec<Uuid> = saves.iter().map(|s| s.shared_content_id).collect();
    let fetched = deps.vector_index.fetch_vectors(&content_ids).await?;

    // Keep only saves whose SharedContent has a vector in the index,
    // preserving stable ordering by save id for deterministic tie-breaks.
    let mut vectors_by_content: std::collections::HashMap<Uuid, Vec<f32>> =
        fetched.into_iter().collect();

    let mut candidates: Vec<(&UserContentSave, Vec<f32>)> = Vec::new();
    for save in &saves {
        if let Some(vector) = vectors_by_content.remove(&save.shared_content_id) {
            candidates.push((save, vector));
        }
    }

    if candidates.len() < deps.config.min_items_for_clustering {
        return Ok(());
    }

    let vectors: Vec<Vec<f32>> = candidates.iter().map(|(_, v)| v.clone()).collect();
    let k = target_cluster_count(vectors.len());
    let labels = math::agglomerative_cluster(&vectors, k);
    let distances = math::distances_for(&vectors);

    let group_count = labels.iter().copied().max().map(|m| m + 1).unwrap_or(0);
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); group_count];
    for (idx, &label) in labels.iter().enumerate() {
        groups[label].push(idx);
    }

    let mut new_clusters: Vec<(String, String, Vec<Uuid>)> = Vec::new();

    for group in groups {
        if group.len() < deps.config.min_cluster_size {
            continue;
        }

        let representative_idx = math::centroid_representative(&group, &distances);

        let mut ordered = group.clone();
        ordered.sort_by(|&a, &b| {
            distances[representative_idx][a]
                .partial_cmp(&distances[representative_idx][b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let sample_content_ids: Vec<Uuid> = ordered
            .iter()
            .take(5)
            .map(|&idx| candidates[idx].0.shared_content_id)
            .collect();
        let samples = build_samples(&sample_content_ids, &deps.db_pool).await?;

        let label = generate_label(deps, category, &samples).await;

        let member_save_ids: Vec<Uuid> = group.iter().map(|&idx| candidates[idx].0.id).collect();
        new_clusters.push((label.label, label.description, member_save_ids));
    }

    let mut tx = deps.db_pool.begin().await?;

    // Serialise concurrent clustering runs for the same (user, category).
    // Hashing happens in Postgres itself so every worker process derives
    // the identical lock key regardless of build or platform.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('cluster:' || $1 || ':' || $2))")
        .bind(user_id)
        .bind(category.to_string())
        .execute(&mut *tx)
        .await?;

    Cluster::delete_for_user_category_in_tx(user_id, category, &mut tx).await?;

    for (label, description, member_save_ids) in new_clusters {
        let cluster = Cluster::create_in_tx(user_id, category, &label, &description, &mut tx).await?;
        for save_id in member_save_ids {
            ClusterMembership::create_in_tx(cluster.id, save_id, &mut tx).await?;
        }
    }

    tx.commit().await?;

    Ok(())
}

async fn build_samples(content_ids: &[Uuid], pool: &sqlx::PgPool) -> CoreResult<Vec<SampleMember>> {
    let mut samples = Vec::with_capacity(content_ids.len());
    for &id in content_ids {
        let content = SharedContent::find_by_id(id, pool).await?;
        let locations: Vec<String> = serde_json::from_value(content.locations).unwrap_or_default();
        let subcategories: Vec<String> =
            serde_json::from_value(content.subcategories).unwrap_or_default();
        samples.push(SampleMember {
            topic_main: content.topic_main,
            title: content.title,
            locations,
            subcategories,
        });
    }
    Ok(samples)
}

async fn generate_label(
    deps: &ServiceDeps,
    category: ContentCategory,
    samples: &[SampleMember],
) -> ClusterLabel {
    let prompt = labelling::build_prompt(category, samples);
    deps.ai_rate_limiter.until_ready().await;
    match deps
        .ai
        .extract::<ClusterLabel>(&deps.config.classification_model, labelling::LABEL_SYSTEM_PROMPT, prompt)
        .await
    {
        Ok(label) => label,
        Err(e) => {
            tracing::warn!(error = %e, "cluster labelling LLM call failed, using rule-based fallback");
            labelling::fallback_label(category, samples)
        }
    }
}
