mod app;
mod config;
mod http;
mod metrics;
mod report;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use report::ReportError;
pub use validation::ValidationError;
