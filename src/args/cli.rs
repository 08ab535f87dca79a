use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Fixed-volume concurrent HTTP load harness - issues N GET requests through a bounded worker pool and reports throughput, latency, CPU and memory."
)]
pub struct LoadArgs {
    /// Target URL (GET only)
    #[arg(long, short, env = "LOADPROBE_URL")]
    pub url: Option<String>,

    /// Total number of requests to issue
    #[arg(
        long = "requests",
        short = 'n',
        default_value = "1000",
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Max requests in flight at once (default: min(100, 2 x available CPUs))
    #[arg(long = "concurrency", short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        short = 't',
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Status code counted as success (exact match)
    #[arg(long = "status", short = 's', default_value = "200")]
    pub expected_status_code: u16,

    /// Max redirects to follow (0 disables redirects)
    #[arg(long = "redirect", default_value = "10")]
    pub redirect_limit: u32,

    /// Do not send the default User-Agent header
    #[arg(long = "no-ua")]
    pub no_ua: bool,

    /// Path to config file (TOML/JSON). Defaults to ./loadprobe.toml or ./loadprobe.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Write the final report to this file
    #[arg(long = "output", short = 'o')]
    pub output: Option<String>,

    /// Report format for --output (text or json; inferred from the extension when omitted)
    #[arg(long = "output-format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADPROBE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
