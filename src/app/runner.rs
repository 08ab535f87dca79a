use std::fmt;
use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::config::LoadTestConfig;
use crate::error::AppResult;
use crate::http::{RequestExecutor, ReqwestTransport, Transport};
use crate::metrics::{MetricsAggregator, RunMetrics};
use crate::pool::WorkerPool;
use crate::resource::{MemoryProbe, MemorySample, ResourceSampler};
use crate::shutdown::ShutdownReceiver;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Lifecycle of a single run. There is no failed state: request failures are
/// counted, and invalid configuration never reaches `Configured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Configured,
    Running,
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Configured => "configured",
            RunPhase::Running => "running",
            RunPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Everything reported at the end of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: Url,
    pub concurrency: usize,
    pub metrics: RunMetrics,
    pub memory_before: MemorySample,
    pub memory_after: MemorySample,
    pub peak_memory: MemorySample,
    /// Set when a shutdown signal stopped the run early.
    pub cancelled: bool,
    pub peak_in_flight: usize,
}

/// Runs `config` against the real HTTP transport, stopping early on
/// Ctrl+C/SIGTERM.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or a worker task
/// fails to join.
pub async fn run_load_test(config: &LoadTestConfig) -> AppResult<RunReport> {
    let transport = ReqwestTransport::new(config)?;
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let result = run_with_transport(config, transport, &ResourceSampler::new(), shutdown_rx).await;

    // Lets the signal task exit through its shutdown branch.
    drop(shutdown_tx.send(()));
    signal_handle.await?;
    result
}

/// Drives one run through `Configured -> Running -> Completed` with the given
/// transport and memory probe.
///
/// # Errors
///
/// Returns an error only when a worker task fails to join.
pub async fn run_with_transport<T, P>(
    config: &LoadTestConfig,
    transport: T,
    sampler: &ResourceSampler<P>,
    shutdown_rx: ShutdownReceiver,
) -> AppResult<RunReport>
where
    T: Transport + 'static,
    P: MemoryProbe,
{
    let pool = WorkerPool::new(config);
    info!(
        "Run {}: {} requests to {} with {} workers (timeout {:?}).",
        RunPhase::Configured,
        config.total_requests(),
        config.target_url(),
        pool.worker_count(),
        config.per_request_timeout()
    );

    let memory_before = sampler.sample_now();
    let aggregator = Arc::new(MetricsAggregator::start(config.total_requests()));
    let executor = Arc::new(RequestExecutor::new(
        transport,
        config.expected_status_code(),
    ));

    info!("Run {}.", RunPhase::Running);
    let pool_report = pool
        .run(executor, Arc::clone(&aggregator), shutdown_rx)
        .await?;

    let metrics = aggregator.finish();
    let memory_after = sampler.sample_now();
    info!(
        "Run {}: {} of {} requests resolved{}.",
        RunPhase::Completed,
        metrics.recorded(),
        metrics.total_requests,
        if pool_report.cancelled {
            " (cancelled)"
        } else {
            ""
        }
    );

    Ok(RunReport {
        target: config.target_url().clone(),
        concurrency: config.concurrency(),
        metrics,
        memory_before,
        memory_after,
        peak_memory: memory_before.peak(memory_after),
        cancelled: pool_report.cancelled,
        peak_in_flight: pool_report.peak_in_flight,
    })
}
