use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ReportError;

use super::runner::RunReport;

/// Divisor for `x100` fixed-point values.
const PERCENT_DIVISOR: u64 = 100;
/// Microseconds per millisecond.
const US_PER_MS: u64 = 1_000;
/// Milliseconds per second.
const MS_PER_SEC: u128 = 1_000;

/// Renders the final report as plain text, one figure per line.
///
/// # Errors
///
/// Returns an error if formatting into the output buffer fails.
pub fn render_text(report: &RunReport) -> Result<String, ReportError> {
    write_summary(report).map_err(|err| ReportError::WriteLine { source: err })
}

fn write_summary(report: &RunReport) -> Result<String, std::fmt::Error> {
    let metrics = &report.metrics;
    let latency = &metrics.latency;
    let success_rate = metrics.success_rate_x100();
    let mut out = String::new();

    writeln!(out, "Target: {}", report.target)?;
    writeln!(out, "Concurrency: {}", report.concurrency)?;
    writeln!(out, "Total Requests: {}", metrics.total_requests)?;
    if report.cancelled || !metrics.is_complete() {
        writeln!(
            out,
            "Recorded: {} of {} (cancelled)",
            metrics.recorded(),
            metrics.total_requests
        )?;
    }
    writeln!(
        out,
        "Successful: {} ({}.{:02}%)",
        metrics.success_count,
        success_rate / PERCENT_DIVISOR,
        success_rate % PERCENT_DIVISOR
    )?;
    writeln!(out, "Failed: {}", metrics.failure_count)?;
    writeln!(out, "Timeouts: {}", metrics.timeout_count)?;
    writeln!(out, "Transport Errors: {}", metrics.transport_error_count)?;
    writeln!(
        out,
        "Unexpected Status: {}",
        metrics.unexpected_status_count
    )?;
    writeln!(out, "Wall Clock: {}", format_seconds(metrics.wall_clock))?;
    writeln!(out, "CPU Time: {}", format_seconds(metrics.cpu_time))?;
    match report.peak_memory.mb_x100() {
        Some(mb_x100) => writeln!(
            out,
            "Peak Memory: {}.{:02} MB",
            mb_x100 / PERCENT_DIVISOR,
            mb_x100 % PERCENT_DIVISOR
        )?,
        None => writeln!(out, "Peak Memory: unavailable")?,
    }
    writeln!(
        out,
        "Throughput: {}.{:02} req/s",
        metrics.throughput_x100 / PERCENT_DIVISOR,
        metrics.throughput_x100 % PERCENT_DIVISOR
    )?;
    writeln!(
        out,
        "Min/Avg/Max Latency: {} / {} / {}",
        format_latency_us(latency.min_us),
        format_latency_us(latency.avg_us),
        format_latency_us(latency.max_us)
    )?;
    writeln!(
        out,
        "P50/P90/P99 Latency: {} / {} / {}",
        format_latency_us(latency.p50_us),
        format_latency_us(latency.p90_us),
        format_latency_us(latency.p99_us)
    )?;
    writeln!(out, "Peak In Flight: {}", report.peak_in_flight)?;
    Ok(out)
}

/// Prints the text report to stdout.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub fn print_summary(report: &RunReport) -> Result<(), ReportError> {
    print!("{}", render_text(report)?);
    Ok(())
}

pub(super) fn format_seconds(duration: Duration) -> String {
    let millis = duration.as_millis();
    format!("{}.{:03}s", millis / MS_PER_SEC, millis % MS_PER_SEC)
}

pub(super) fn format_latency_us(value_us: u64) -> String {
    format!("{}.{:03}ms", value_us / US_PER_MS, value_us % US_PER_MS)
}
