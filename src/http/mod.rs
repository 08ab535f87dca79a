//! Request execution: the transport seam and per-request outcome classification.
mod executor;
mod outcome;
mod transport;

#[cfg(test)]
mod tests;

pub use executor::RequestExecutor;
pub use outcome::{ErrorKind, RequestOutcome};
pub use transport::{ReqwestTransport, Transport, TransportFailure};
