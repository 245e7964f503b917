use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use keepwell_core::error::CoreResult;
use keepwell_core::queue::JobQueue;
use rand::Rng;
use serde::Deserialize;

/// Long-poll one queue forever, running `handler` for each message on its
/// own task. A message is deleted only once `handler` returns `Ok`; any
/// `Err` leaves it in the queue to be redelivered and retried after the
/// visibility timeout elapses.
///
/// While `handler` runs, a heartbeat task periodically extends the
/// message's visibility so a slow job (an LLM call, a clustering pass over
/// thousands of saves) doesn't get redelivered to another consumer out
/// from under it.
pub async fn run_consumer_loop<T, Q, F, Fut>(
    queue: Arc<Q>,
    concurrency: usize,
    visibility_timeout_secs: i32,
    handler: F,
) where
    T: for<'de> Deserialize<'de> + Send + 'static,
    Q: JobQueue<T> + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<()>> + Send,
{
    let mut consecutive_failures: u32 = 0;

    loop {
        let messages = match queue.receive(concurrency as i32).await {
            Ok(messages) => {
                consecutive_failures = 0;
                messages
            }
            Err(e) => {
                consecutive_failures += 1;
                tracing::warn!(error = %e, consecutive_failures, "queue receive failed");
                tokio::time::sleep(backoff_with_jitter(consecutive_failures)).await;
                continue;
            }
        };

        if messages.is_empty() {
            continue;
        }

        let mut tasks = Vec::with_capacity(messages.len());
        for message in messages {
            let queue = queue.clone();
            let handler = handler.clone();
            tasks.push(tokio::spawn(async move {
                run_one(queue, message, visibility_timeout_secs, handler).await;
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "job task panicked");
            }
        }
    }
}

async fn run_one<T, Q, F, Fut>(
    queue: Arc<Q>,
    message: keepwell_core::queue::ReceivedMessage<T>,
    visibility_timeout_secs: i32,
    handler: F,
) where
    T: Send + 'static,
    Q: JobQueue<T> + 'static,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = CoreResult<()>> + Send,
{
    let receipt_handle = message.receipt_handle.clone();
    let heartbeat_queue = queue.clone();
    let heartbeat_handle = receipt_handle.clone();
    let heartbeat_interval = Duration::from_secs((visibility_timeout_secs.max(2) / 2) as u64);

    let heartbeat = tokio::spawn(async move {
        loop {
            tokio::time::sleep(heartbeat_interval).await;
            if let Err(e) = heartbeat_queue
                .extend_visibility(&heartbeat_handle, visibility_timeout_secs)
                .await
            {
                tracing::warn!(error = %e, "failed to extend message visibility");
            }
        }
    });

    let result = handler(message.body).await;
    heartbeat.abort();

    match result {
        Ok(()) => {
            if let Err(e) = queue.delete(&receipt_handle).await {
                tracing::error!(error = %e, "failed to delete completed message");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "job handler failed, leaving message for redelivery");
        }
    }
}

fn backoff_with_jitter(attempt: u32) -> Duration {
    let base_ms = 500u64.saturating_mul(1u64 << attempt.min(6));
    let jitter_ms = rand::thread_rng().gen_range(0..=250);
    Duration::from_millis(base_ms.min(30_000) + jitter_ms)
}
