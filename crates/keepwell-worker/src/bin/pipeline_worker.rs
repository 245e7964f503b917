use std::sync::Arc;

use anyhow::Result;
use keepwell_core::queue::ContentJobMessage;
use keepwell_domains::models::ProcessingJob;
use keepwell_worker::consumer::run_consumer_loop;
use sqs_client::{ContentJobQueue, SqsClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    tracing::info!("starting keepwell-pipeline-worker");

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
    let queue = Arc::new(ContentJobQueue(sqs.clone()));

    run_consumer_loop(queue, 5, visibility_timeout_secs, move |message: ContentJobMessage| {
        let deps = deps.clone();
        let sqs = sqs.clone();
        async move {
            let ContentJobMessage::IngestContent {
                shared_content_id,
                url,
            } = message;

            let job = ProcessingJob::create(shared_content_id, "ingest_content", &deps.db_pool).await?;

            tracing::info!(%shared_content_id, job_id = %job.id, "processing content job");
            keepwell_domains::pipeline::process_content_job(&deps, &sqs, job.id, shared_content_id, &url).await
        }
    })
    .await;

    Ok(())
}
