use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Latency figures in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub min_us: u64,
    pub max_us: u64,
    pub avg_us: u64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p99_us: u64,
}

/// Final, read-only figures for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    /// Requests the run was configured to issue.
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub timeout_count: u64,
    pub transport_error_count: u64,
    pub unexpected_status_count: u64,
    pub wall_clock: Duration,
    pub cpu_time: Duration,
    /// Requests per second scaled by 100.
    pub throughput_x100: u64,
    pub latency: LatencySummary,
}

impl RunMetrics {
    /// Outcomes actually recorded; below `total_requests` only for partial runs.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.success_count.saturating_add(self.failure_count)
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.recorded() == self.total_requests
    }

    /// Success rate in basis points (0..=10_000).
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        let recorded = self.recorded();
        if recorded == 0 {
            return 0;
        }
        let scaled = u128::from(self.success_count)
            .saturating_mul(10_000)
            .checked_div(u128::from(recorded))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

/// `requests / wall_clock`, scaled by 100. Zero when no time elapsed.
#[must_use]
pub fn throughput_x100(requests: u64, wall_clock: Duration) -> u64 {
    let nanos = wall_clock.as_nanos();
    if nanos == 0 {
        return 0;
    }
    let scaled = u128::from(requests)
        .saturating_mul(100)
        .saturating_mul(NANOS_PER_SEC)
        .checked_div(nanos)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
