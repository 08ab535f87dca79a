use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::http::{ErrorKind, RequestOutcome};

use super::cpu::process_cpu_time;
use super::histogram::LatencyHistogram;
use super::types::{LatencySummary, RunMetrics, throughput_x100};

struct LatencyState {
    histogram: Option<LatencyHistogram>,
    sum_us: u128,
    min_us: u64,
    max_us: u64,
}

impl LatencyState {
    fn new() -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                warn!("Failed to initialize latency histogram: {}", err);
                None
            }
        };
        Self {
            histogram,
            sum_us: 0,
            min_us: u64::MAX,
            max_us: 0,
        }
    }

    fn record(&mut self, latency_us: u64) {
        self.sum_us = self.sum_us.saturating_add(u128::from(latency_us));
        self.min_us = self.min_us.min(latency_us);
        self.max_us = self.max_us.max(latency_us);
        if let Some(histogram) = self.histogram.as_mut()
            && let Err(err) = histogram.record(latency_us)
        {
            warn!("Dropping latency sample: {}", err);
        }
    }

    fn summary(&self, count: u64) -> LatencySummary {
        if count == 0 {
            return LatencySummary::default();
        }
        let avg = self.sum_us.checked_div(u128::from(count)).unwrap_or(0);
        let (p50_us, p90_us, p99_us) = self
            .histogram
            .as_ref()
            .map_or((0, 0, 0), LatencyHistogram::percentiles);
        LatencySummary {
            min_us: self.min_us,
            max_us: self.max_us,
            avg_us: u64::try_from(avg).unwrap_or(u64::MAX),
            p50_us,
            p90_us,
            p99_us,
        }
    }
}

/// Folds request outcomes into run totals. `record` may be called from many
/// workers at once; counters are atomics and latency sits behind one short
/// mutex.
pub struct MetricsAggregator {
    total_requests: u64,
    started_at: Instant,
    cpu_start: Option<Duration>,
    recorded: AtomicU64,
    success: AtomicU64,
    timeouts: AtomicU64,
    transport_errors: AtomicU64,
    unexpected_status: AtomicU64,
    latency: Mutex<LatencyState>,
}

impl MetricsAggregator {
    /// Captures the wall-clock and CPU baselines for a run of
    /// `total_requests` requests.
    #[must_use]
    pub fn start(total_requests: u64) -> Self {
        Self {
            total_requests,
            started_at: Instant::now(),
            cpu_start: process_cpu_time(),
            recorded: AtomicU64::new(0),
            success: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            unexpected_status: AtomicU64::new(0),
            latency: Mutex::new(LatencyState::new()),
        }
    }

    /// Counts one outcome. Returns `false`, without counting, once
    /// `total_requests` outcomes have already been recorded.
    pub fn record(&self, outcome: &RequestOutcome) -> bool {
        let reserved = self
            .recorded
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.total_requests).then(|| current.saturating_add(1))
            });
        if reserved.is_err() {
            warn!(
                "Ignoring outcome for slot {}: all {} outcomes already recorded.",
                outcome.slot(),
                self.total_requests
            );
            return false;
        }

        let counter = match outcome.error_kind() {
            None => &self.success,
            Some(ErrorKind::Timeout) => &self.timeouts,
            Some(ErrorKind::TransportError) => &self.transport_errors,
            Some(ErrorKind::UnexpectedStatus) => &self.unexpected_status,
        };
        counter.fetch_add(1, Ordering::AcqRel);

        let latency_us = u64::try_from(outcome.latency().as_micros()).unwrap_or(u64::MAX);
        match self.latency.lock() {
            Ok(mut state) => state.record(latency_us),
            Err(poisoned) => poisoned.into_inner().record(latency_us),
        }
        true
    }

    /// Outcomes recorded so far.
    #[must_use]
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Acquire)
    }

    /// Stops the clocks and derives the final figures from what was recorded.
    #[must_use]
    pub fn finish(&self) -> RunMetrics {
        let wall_clock = self.started_at.elapsed();
        let cpu_time = match (self.cpu_start, process_cpu_time()) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => Duration::ZERO,
        };

        let success_count = self.success.load(Ordering::Acquire);
        let timeout_count = self.timeouts.load(Ordering::Acquire);
        let transport_error_count = self.transport_errors.load(Ordering::Acquire);
        let unexpected_status_count = self.unexpected_status.load(Ordering::Acquire);
        let failure_count = timeout_count
            .saturating_add(transport_error_count)
            .saturating_add(unexpected_status_count);
        let recorded = success_count.saturating_add(failure_count);

        let latency = match self.latency.lock() {
            Ok(state) => state.summary(recorded),
            Err(poisoned) => poisoned.into_inner().summary(recorded),
        };

        RunMetrics {
            total_requests: self.total_requests,
            success_count,
            failure_count,
            timeout_count,
            transport_error_count,
            unexpected_status_count,
            wall_clock,
            cpu_time,
            throughput_x100: throughput_x100(recorded, wall_clock),
            latency,
        }
    }
}
