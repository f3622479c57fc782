//! Bounded delivery queue and retry worker.
//!
//! The producer side never blocks: offering a task to a full buffer
//! drops it on the spot. A single worker drains tasks FIFO and attempts
//! delivery with a fixed retry bound; exhaustion is a silent drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::DeliveryErrorKind;
use crate::protocol::AuthHeaders;

/// Pending-task buffer capacity.
pub(crate) const QUEUE_CAPACITY: usize = 100;
/// Delivery attempts per task.
const MAX_ATTEMPTS: u32 = 3;
/// Fixed delay between attempts. No backoff, no jitter.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// A report waiting for delivery. The body is frozen at enqueue time.
#[derive(Debug)]
pub(crate) struct ReportTask {
    pub url: String,
    pub body: serde_json::Value,
}

/// Producer half of the delivery pipeline.
pub(crate) struct DeliveryQueue {
    tx: mpsc::Sender<ReportTask>,
}

impl DeliveryQueue {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ReportTask>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Offer a task without blocking.
    ///
    /// Returns `false` when the buffer is full or the worker is gone;
    /// the task is dropped either way.
    pub fn offer(&self, task: ReportTask) -> bool {
        self.tx.try_send(task).is_ok()
    }
}

/// Signing identity and transport the worker uses for every attempt.
pub(crate) struct WorkerContext {
    pub app_id: String,
    pub app_secret: String,
    pub http: reqwest::Client,
    pub clock: Arc<dyn Clock>,
}

/// Drain tasks FIFO until the producer side is dropped.
pub(crate) async fn run_worker(mut rx: mpsc::Receiver<ReportTask>, ctx: WorkerContext) {
    while let Some(task) = rx.recv().await {
        send_with_retry(&ctx, &task).await;
    }
    debug!("Delivery worker stopped");
}

/// Attempt delivery up to the retry bound, then drop.
///
/// Headers are re-signed for every attempt: a signature carried over
/// from a failed attempt would trip the server's own freshness and
/// replay checks.
async fn send_with_retry(ctx: &WorkerContext, task: &ReportTask) {
    for attempt in 1..=MAX_ATTEMPTS {
        match send(ctx, task).await {
            Ok(()) => {
                debug!(url = %task.url, attempt, "Report delivered");
                return;
            }
            Err(e) => {
                debug!(url = %task.url, attempt, error = %e, "Delivery attempt failed");
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }
    warn!(url = %task.url, attempts = MAX_ATTEMPTS, "Report dropped after retry exhaustion");
}

/// A single delivery attempt: fresh signed headers, JSON body, POST.
async fn send(ctx: &WorkerContext, task: &ReportTask) -> Result<(), DeliveryErrorKind> {
    let headers = AuthHeaders::build(&ctx.app_id, &ctx.app_secret, ctx.clock.as_ref());

    let mut request = ctx.http.post(&task.url).json(&task.body);
    for (name, value) in headers.pairs() {
        request = request.header(name, value);
    }

    let response = request
        .send()
        .await
        .map_err(DeliveryErrorKind::TransportFailure)?;

    if !response.status().is_success() {
        return Err(DeliveryErrorKind::NonSuccessStatus {
            status: response.status().as_u16(),
        });
    }

    Ok(())
}
