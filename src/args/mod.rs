//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::LoadArgs;
pub use defaults::{DEFAULT_TOTAL_REQUESTS, MAX_CONCURRENCY, default_concurrency};
pub use types::{OutputFormat, PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
