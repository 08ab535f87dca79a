use super::*;
use crate::config::LoadTestConfig;
use crate::error::{AppError, AppResult};
use crate::test_support::{
    FixedTransport, HangingTransport, refused_url, run_async_test, spawn_status_server, test_url,
};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);
const SHORT_TIMEOUT: Duration = Duration::from_millis(50);

#[test]
fn expected_status_is_success() -> AppResult<()> {
    run_async_test(async {
        let executor = RequestExecutor::new(FixedTransport::status(200), 200);
        let outcome = executor.execute(7, &test_url()?, TIMEOUT).await;

        if !outcome.succeeded() {
            return Err(AppError::validation("Expected success"));
        }
        if outcome.status_code() != Some(200) || outcome.error_kind().is_some() {
            return Err(AppError::validation(format!(
                "Unexpected outcome {:?}",
                outcome
            )));
        }
        if outcome.slot() != 7 {
            return Err(AppError::validation("Slot not preserved"));
        }
        Ok(())
    })
}

#[test]
fn other_2xx_is_unexpected_status() -> AppResult<()> {
    run_async_test(async {
        let executor = RequestExecutor::new(FixedTransport::status(204), 200);
        let outcome = executor.execute(0, &test_url()?, TIMEOUT).await;

        if outcome.succeeded() {
            return Err(AppError::validation("204 must not match expected 200"));
        }
        if outcome.error_kind() != Some(ErrorKind::UnexpectedStatus) {
            return Err(AppError::validation("Expected UnexpectedStatus"));
        }
        if outcome.status_code() != Some(204) {
            return Err(AppError::validation("Observed status must be kept"));
        }
        Ok(())
    })
}

#[test]
fn transport_timeout_is_timeout() -> AppResult<()> {
    run_async_test(async {
        let executor =
            RequestExecutor::new(FixedTransport::failing(TransportFailure::Timeout), 200);
        let outcome = executor.execute(0, &test_url()?, TIMEOUT).await;

        if outcome.error_kind() != Some(ErrorKind::Timeout) || outcome.status_code().is_some() {
            return Err(AppError::validation(format!(
                "Unexpected outcome {:?}",
                outcome
            )));
        }
        Ok(())
    })
}

#[test]
fn hanging_transport_is_bounded_by_timeout() -> AppResult<()> {
    run_async_test(async {
        let executor = RequestExecutor::new(HangingTransport, 200);
        let outcome = executor.execute(3, &test_url()?, SHORT_TIMEOUT).await;

        if outcome.error_kind() != Some(ErrorKind::Timeout) {
            return Err(AppError::validation("Expected Timeout"));
        }
        if outcome.latency() < SHORT_TIMEOUT {
            return Err(AppError::validation("Timeout fired too early"));
        }
        Ok(())
    })
}

#[test]
fn slow_transport_is_timeout() -> AppResult<()> {
    run_async_test(async {
        let transport = FixedTransport::status(200).with_delay(Duration::from_millis(500));
        let executor = RequestExecutor::new(transport, 200);
        let outcome = executor.execute(0, &test_url()?, SHORT_TIMEOUT).await;

        if outcome.error_kind() != Some(ErrorKind::Timeout) {
            return Err(AppError::validation("Late reply should be a timeout"));
        }
        Ok(())
    })
}

#[test]
fn transport_failure_is_transport_error() -> AppResult<()> {
    run_async_test(async {
        let transport = Arc::new(FixedTransport::failing(TransportFailure::Transport(
            "connection refused".to_owned(),
        )));
        let executor = RequestExecutor::new(Arc::clone(&transport), 200);
        let outcome = executor.execute(0, &test_url()?, TIMEOUT).await;

        if outcome.error_kind() != Some(ErrorKind::TransportError) {
            return Err(AppError::validation("Expected TransportError"));
        }
        if transport.calls() != 1 {
            return Err(AppError::validation("Transport should be called once"));
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_reads_status() -> AppResult<()> {
    run_async_test(async {
        let (url, _server) = spawn_status_server(200)?;
        let config = LoadTestConfig::new(url.as_str(), 1, 1, TIMEOUT)?;
        let executor = RequestExecutor::new(ReqwestTransport::new(&config)?, 200);

        let outcome = executor.execute(0, config.target_url(), TIMEOUT).await;
        if !outcome.succeeded() {
            return Err(AppError::validation(format!(
                "Expected success from local server, got {:?}",
                outcome
            )));
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_reports_unexpected_status() -> AppResult<()> {
    run_async_test(async {
        let (url, _server) = spawn_status_server(503)?;
        let config = LoadTestConfig::new(url.as_str(), 1, 1, TIMEOUT)?;
        let executor = RequestExecutor::new(ReqwestTransport::new(&config)?, 200);

        let outcome = executor.execute(0, config.target_url(), TIMEOUT).await;
        if outcome.error_kind() != Some(ErrorKind::UnexpectedStatus)
            || outcome.status_code() != Some(503)
        {
            return Err(AppError::validation(format!(
                "Expected 503 UnexpectedStatus, got {:?}",
                outcome
            )));
        }
        Ok(())
    })
}

#[test]
fn reqwest_transport_refused_is_transport_error() -> AppResult<()> {
    run_async_test(async {
        let url = refused_url()?;
        let config = LoadTestConfig::new(url.as_str(), 1, 1, TIMEOUT)?;
        let executor = RequestExecutor::new(ReqwestTransport::new(&config)?, 200);

        let outcome = executor.execute(0, config.target_url(), TIMEOUT).await;
        if outcome.error_kind() != Some(ErrorKind::TransportError) {
            return Err(AppError::validation(format!(
                "Expected TransportError, got {:?}",
                outcome
            )));
        }
        Ok(())
    })
}
