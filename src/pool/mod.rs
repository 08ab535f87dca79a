//! Bounded pool of request workers.
mod slots;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};
use url::Url;

use crate::config::LoadTestConfig;
use crate::error::AppResult;
use crate::http::{RequestExecutor, RequestOutcome, Transport};
use crate::metrics::MetricsAggregator;
use crate::shutdown::ShutdownReceiver;

use slots::{InflightGauge, SlotCounter};

/// What a pool run produced.
#[derive(Debug, Clone)]
pub struct PoolReport {
    /// Every outcome emitted, in completion order per worker.
    pub outcomes: Vec<RequestOutcome>,
    /// True when a shutdown signal stopped workers before all slots were claimed.
    pub cancelled: bool,
    /// Highest number of requests observed in flight at once.
    pub peak_in_flight: usize,
}

impl PoolReport {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs `concurrency` workers that each claim slots from a shared counter
/// until every slot is resolved or shutdown is signalled.
///
/// The worker count is the only admission control: a worker has at most one
/// request in flight, so in-flight requests never exceed `concurrency`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    target: Url,
    total_requests: u64,
    concurrency: usize,
    per_request_timeout: Duration,
}

struct WorkerShared<T> {
    executor: Arc<RequestExecutor<T>>,
    aggregator: Arc<MetricsAggregator>,
    slots: SlotCounter,
    in_flight: InflightGauge,
    target: Url,
    timeout: Duration,
}

impl WorkerPool {
    #[must_use]
    pub fn new(config: &LoadTestConfig) -> Self {
        Self {
            target: config.target_url().clone(),
            total_requests: config.total_requests(),
            concurrency: config.concurrency(),
            per_request_timeout: config.per_request_timeout(),
        }
    }

    /// Workers actually spawned; never more than there are slots.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        let total = usize::try_from(self.total_requests).unwrap_or(usize::MAX);
        self.concurrency.min(total).max(1)
    }

    /// Drives every slot through `executor`, recording each outcome into
    /// `aggregator` as it arrives. `shutdown_rx` must be subscribed before the
    /// run starts; a signal already pending on it cancels the run up front.
    ///
    /// # Errors
    ///
    /// Returns an error only when a worker task panics or is aborted.
    pub async fn run<T>(
        &self,
        executor: Arc<RequestExecutor<T>>,
        aggregator: Arc<MetricsAggregator>,
        mut shutdown_rx: ShutdownReceiver,
    ) -> AppResult<PoolReport>
    where
        T: Transport + 'static,
    {
        let worker_count = self.worker_count();
        let shared = Arc::new(WorkerShared {
            executor,
            aggregator,
            slots: SlotCounter::new(self.total_requests),
            in_flight: InflightGauge::default(),
            target: self.target.clone(),
            timeout: self.per_request_timeout,
        });

        debug!(
            "Spawning {} workers for {} requests.",
            worker_count, self.total_requests
        );

        let receivers: Vec<ShutdownReceiver> = (0..worker_count)
            .map(|_| shutdown_rx.resubscribe())
            .collect();
        if shutdown_requested(&mut shutdown_rx) {
            warn!("Shutdown requested before any request was issued.");
            return Ok(PoolReport {
                outcomes: Vec::new(),
                cancelled: true,
                peak_in_flight: 0,
            });
        }

        let mut handles = Vec::with_capacity(worker_count);
        for (worker_id, worker_rx) in receivers.into_iter().enumerate() {
            let shared = Arc::clone(&shared);
            handles.push(tokio::spawn(run_worker(worker_id, shared, worker_rx)));
        }

        let capacity = usize::try_from(self.total_requests).unwrap_or(0);
        let joined = join_workers(handles, capacity).await?;

        // A signal may land after the last slot was already claimed.
        let unclaimed = shared.slots.claimed() < self.total_requests;
        let cancelled = joined.cancelled && unclaimed;
        if cancelled {
            warn!(
                "Run cancelled: {} of {} requests resolved.",
                joined.outcomes.len(),
                self.total_requests
            );
        }

        Ok(PoolReport {
            outcomes: joined.outcomes,
            cancelled,
            peak_in_flight: shared.in_flight.peak(),
        })
    }
}

struct WorkerResult {
    outcomes: Vec<RequestOutcome>,
    cancelled: bool,
}

/// Merges every worker's result. A worker that panicked or was aborted fails
/// the run, and the workers still running are aborted before returning.
async fn join_workers(
    handles: Vec<JoinHandle<WorkerResult>>,
    capacity: usize,
) -> AppResult<WorkerResult> {
    let abort_handles: Vec<AbortHandle> = handles
        .iter()
        .map(JoinHandle::abort_handle)
        .collect();
    let mut joined = WorkerResult {
        outcomes: Vec::with_capacity(capacity),
        cancelled: false,
    };
    for handle in handles {
        match handle.await {
            Ok(worker) => {
                joined.cancelled |= worker.cancelled;
                joined.outcomes.extend(worker.outcomes);
            }
            Err(err) => {
                warn!("Worker task failed; aborting remaining workers: {}", err);
                for abort_handle in &abort_handles {
                    abort_handle.abort();
                }
                return Err(err.into());
            }
        }
    }
    Ok(joined)
}

async fn run_worker<T>(
    worker_id: usize,
    shared: Arc<WorkerShared<T>>,
    mut shutdown_rx: ShutdownReceiver,
) -> WorkerResult
where
    T: Transport,
{
    let mut outcomes = Vec::new();
    loop {
        if shutdown_requested(&mut shutdown_rx) {
            debug!("Worker {} stopping on shutdown.", worker_id);
            return WorkerResult {
                outcomes,
                cancelled: true,
            };
        }
        let Some(slot) = shared.slots.claim() else {
            break;
        };

        let outcome = {
            let _in_flight = shared.in_flight.acquire();
            shared
                .executor
                .execute(slot, &shared.target, shared.timeout)
                .await
        };
        if shared.aggregator.record(&outcome) {
            outcomes.push(outcome);
        }
    }
    WorkerResult {
        outcomes,
        cancelled: false,
    }
}

fn shutdown_requested(shutdown_rx: &mut ShutdownReceiver) -> bool {
    match shutdown_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty | TryRecvError::Closed) => false,
    }
}
