//! Run metrics: lock-free outcome counters, latency histogram, CPU clock.
mod aggregator;
mod cpu;
mod histogram;
mod types;


pub use aggregator::MetricsAggregator;
pub use cpu::process_cpu_time;
pub use histogram::LatencyHistogram;
pub use types::{LatencySummary, RunMetrics, throughput_x100};
