use std::path::PathBuf;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::args::OutputFormat;
use crate::error::ReportError;

use super::runner::RunReport;
use super::summary::render_text;

/// Explicit `--output-format` wins; otherwise the extension decides, and
/// anything unrecognised is written as text.
#[must_use]
pub fn resolve_output_format(path: &str, explicit: Option<OutputFormat>) -> OutputFormat {
    explicit
        .or_else(|| OutputFormat::infer(path))
        .unwrap_or(OutputFormat::Text)
}

#[must_use]
pub fn report_json(report: &RunReport) -> serde_json::Value {
    let metrics = &report.metrics;
    let latency = &metrics.latency;
    serde_json::json!({
        "target": report.target.as_str(),
        "concurrency": report.concurrency,
        "total_requests": metrics.total_requests,
        "recorded": metrics.recorded(),
        "cancelled": report.cancelled,
        "success_count": metrics.success_count,
        "failure_count": metrics.failure_count,
        "failures": {
            "timeout": metrics.timeout_count,
            "transport_error": metrics.transport_error_count,
            "unexpected_status": metrics.unexpected_status_count
        },
        "success_rate_x100": metrics.success_rate_x100(),
        "wall_clock_ms": metrics.wall_clock.as_millis(),
        "cpu_time_ms": metrics.cpu_time.as_millis(),
        "throughput_x100": metrics.throughput_x100,
        "memory": {
            "before_bytes": report.memory_before.bytes(),
            "after_bytes": report.memory_after.bytes(),
            "peak_bytes": report.peak_memory.bytes(),
            "peak_mb_x100": report.peak_memory.mb_x100()
        },
        "latency_us": {
            "min": latency.min_us,
            "avg": latency.avg_us,
            "max": latency.max_us,
            "p50": latency.p50_us,
            "p90": latency.p90_us,
            "p99": latency.p99_us
        },
        "peak_in_flight": report.peak_in_flight
    })
}

/// Writes the report to `path` in `format`.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized or the file cannot be
/// written.
pub async fn export_report(
    path: &str,
    format: OutputFormat,
    report: &RunReport,
) -> Result<(), ReportError> {
    let payload = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_vec_pretty(&report_json(report))
                .map_err(|err| ReportError::SerializeJson { source: err })?;
            json.push(b'\n');
            json
        }
        OutputFormat::Text => render_text(report)?.into_bytes(),
    };

    let write_err = |err: std::io::Error| ReportError::WriteFile {
        path: PathBuf::from(path),
        source: err,
    };
    let file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&payload).await.map_err(write_err)?;
    writer.flush().await.map_err(write_err)?;
    Ok(())
}
