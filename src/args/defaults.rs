use std::num::NonZeroUsize;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadprobe/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TOTAL_REQUESTS: u64 = 1000;

/// Hard ceiling on concurrent requests, whatever the caller asks for.
pub const MAX_CONCURRENCY: usize = 1024;

/// Cap applied to the derived default.
const DEFAULT_CONCURRENCY_CAP: usize = 100;
/// Workers per available CPU for the derived default.
const WORKERS_PER_CPU: usize = 2;

/// Default concurrency: two workers per available CPU, at most 100.
#[must_use]
pub fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    concurrency_for_cpus(cpus)
}

pub(super) fn concurrency_for_cpus(cpus: usize) -> usize {
    cpus.saturating_mul(WORKERS_PER_CPU)
        .clamp(1, DEFAULT_CONCURRENCY_CAP)
}
