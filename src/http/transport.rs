use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, Url, redirect};

use crate::args::DEFAULT_USER_AGENT;
use crate::config::LoadTestConfig;
use crate::error::HttpError;

/// Failure reported by a transport before a status code was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Transport(String),
}

/// Issues one GET and reports the status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<u16, TransportFailure>;
}

#[async_trait]
impl<T> Transport for std::sync::Arc<T>
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &Url, timeout: Duration) -> Result<u16, TransportFailure> {
        (**self).get(url, timeout).await
    }
}

/// Transport backed by a single pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared HTTP client for a run.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be constructed
    /// (for example when the TLS backend fails to initialise).
    pub fn new(config: &LoadTestConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder()
            .timeout(config.per_request_timeout())
            .connect_timeout(config.connect_timeout());

        if config.send_user_agent() {
            builder = builder.user_agent(DEFAULT_USER_AGENT);
        }

        builder = if config.redirect_limit() == 0 {
            builder.redirect(redirect::Policy::none())
        } else {
            builder.redirect(redirect::Policy::limited(
                usize::try_from(config.redirect_limit()).unwrap_or(usize::MAX),
            ))
        };

        let client = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<u16, TransportFailure> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| classify(&err))?;
        let status = response.status().as_u16();
        drain_response_body(response)
            .await
            .map_err(|err| classify(&err))?;
        Ok(status)
    }
}

fn classify(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Transport(err.to_string())
    }
}

async fn drain_response_body(response: Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
