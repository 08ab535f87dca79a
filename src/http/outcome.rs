use std::time::Duration;

/// Why a request did not count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    TransportError,
    UnexpectedStatus,
}

/// Classified result of a single request attempt.
///
/// `status_code` is present only when the request completed; `error_kind` is
/// present only when it did not count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    slot: u64,
    status_code: Option<u16>,
    error_kind: Option<ErrorKind>,
    latency: Duration,
}

impl RequestOutcome {
    #[must_use]
    pub const fn success(slot: u64, status_code: u16, latency: Duration) -> Self {
        Self {
            slot,
            status_code: Some(status_code),
            error_kind: None,
            latency,
        }
    }

    #[must_use]
    pub const fn unexpected_status(slot: u64, status_code: u16, latency: Duration) -> Self {
        Self {
            slot,
            status_code: Some(status_code),
            error_kind: Some(ErrorKind::UnexpectedStatus),
            latency,
        }
    }

    #[must_use]
    pub const fn timeout(slot: u64, latency: Duration) -> Self {
        Self {
            slot,
            status_code: None,
            error_kind: Some(ErrorKind::Timeout),
            latency,
        }
    }

    #[must_use]
    pub const fn transport_error(slot: u64, latency: Duration) -> Self {
        Self {
            slot,
            status_code: None,
            error_kind: Some(ErrorKind::TransportError),
            latency,
        }
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error_kind.is_none()
    }

    #[must_use]
    pub const fn slot(&self) -> u64 {
        self.slot
    }

    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }
}
