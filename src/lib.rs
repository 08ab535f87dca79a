//! Core library for the `loadprobe` CLI.
//!
//! Issues a fixed number of GET requests through a bounded worker pool and
//! reports throughput, latency, CPU time, and peak resident memory. The
//! binary wires these pieces together; the library exposes them so runs can
//! be driven with a custom [`http::Transport`].
pub mod app;
pub mod args;
pub mod config;
mod entry;
pub mod error;
pub mod http;
mod logger;
pub mod metrics;
pub mod pool;
pub mod resource;
pub mod shutdown;
pub mod shutdown_handlers;

#[cfg(test)]
mod test_support;

pub use entry::run;
