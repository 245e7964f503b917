use std::sync::Arc;

use anyhow::Result;
use keepwell_core::queue::ClusteringJobMessage;
use keepwell_domains::clustering::cluster_user_category;
use keepwell_worker::consumer::run_consumer_loop;
use sqs_client::{ClusteringJobQueue, SqsClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    tracing::info!("starting keepwell-clustering-worker");

    let config = keepwell_core::AppConfig::from_env()?;
    let visibility_timeout_secs = config.queue_visibility_timeout_secs;
    let deps = Arc::new(keepwell_worker::build_deps(config.clone()).await?);

    let sqs = Arc::new(
        SqsClient::from_env(
            config.sqs_content_queue_url.clone(),
            config.sqs_clustering_queue_url.clone(),
            config.queue_wait_time_secs,
            visibility_timeout_secs,
        )
        .await,
    );
    let queue = Arc::new(ClusteringJobQueue(sqs));

    run_consumer_loop(queue, 2, visibility_timeout_secs, move |message: ClusteringJobMessage| {
        let deps = deps.clone();
        async move {
            let ClusteringJobMessage::ClusterUser {
                user_id,
                content_category,
            } = message;

            let categories = match content_category {
                Some(category) => vec![category],
                None => keepwell_core::enums::ContentCategory::ALL.to_vec(),
            };

            for category in categories {
                tracing::info!(%user_id, ?category, "clustering user category");
                cluster_user_category(&deps, user_id, category).await?;
            }

            Ok(())
        }
    })
    .await;

    Ok(())
}
