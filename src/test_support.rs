//! Stub transports and a tiny HTTP server shared by unit tests.
use std::future::Future;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{AppError, AppResult};
use crate::http::{Transport, TransportFailure};
use crate::resource::MemoryProbe;
use crate::shutdown::ShutdownSender;

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

pub(crate) fn test_url() -> AppResult<Url> {
    Url::parse("http://127.0.0.1:9/")
        .map_err(|err| AppError::validation(format!("Failed to parse test url: {}", err)))
}

/// Answers every call with the same result after an optional delay.
pub(crate) struct FixedTransport {
    result: Result<u16, TransportFailure>,
    delay: Duration,
    calls: AtomicU64,
}

impl FixedTransport {
    pub(crate) const fn status(status: u16) -> Self {
        Self {
            result: Ok(status),
            delay: Duration::ZERO,
            calls: AtomicU64::new(0),
        }
    }

    pub(crate) const fn failing(failure: TransportFailure) -> Self {
        Self {
            result: Err(failure),
            delay: Duration::ZERO,
            calls: AtomicU64::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FixedTransport {
    async fn get(&self, _url: &Url, _timeout: Duration) -> Result<u16, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Never completes on its own; only the caller's timeout ends the call.
pub(crate) struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn get(&self, _url: &Url, _timeout: Duration) -> Result<u16, TransportFailure> {
        std::future::pending::<()>().await;
        Ok(200)
    }
}

/// Succeeds, and fires the shutdown signal from inside the Nth call.
pub(crate) struct CancelAfterTransport {
    cancel_on_call: u64,
    calls: AtomicU64,
    shutdown_tx: ShutdownSender,
}

impl CancelAfterTransport {
    pub(crate) const fn new(cancel_on_call: u64, shutdown_tx: ShutdownSender) -> Self {
        Self {
            cancel_on_call,
            calls: AtomicU64::new(0),
            shutdown_tx,
        }
    }
}

#[async_trait]
impl Transport for CancelAfterTransport {
    async fn get(&self, _url: &Url, _timeout: Duration) -> Result<u16, TransportFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if call == self.cancel_on_call {
            drop(self.shutdown_tx.send(()));
        }
        Ok(200)
    }
}

/// Reports a fixed resident size, or none.
pub(crate) struct FixedMemoryProbe(pub(crate) Option<u64>);

impl MemoryProbe for FixedMemoryProbe {
    fn resident_bytes(&self) -> Option<u64> {
        self.0
    }
}

pub(crate) struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        drop(self.shutdown.send(()));
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawns a blocking HTTP/1.1 server that answers every request with `status`.
pub(crate) fn spawn_status_server(status: u16) -> AppResult<(Url, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream, status));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    let url = Url::parse(&format!("http://{}/posts/1", addr))
        .map_err(|err| AppError::validation(format!("Bad server url: {}", err)))?;
    Ok((
        url,
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn handle_client(mut stream: TcpStream, status: u16) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 2048];
    if stream.read(&mut buffer).is_err() {
        return;
    }
    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        status
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// A local address with nothing listening on it.
pub(crate) fn refused_url() -> AppResult<Url> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Url::parse(&format!("http://{}/", addr))
        .map_err(|err| AppError::validation(format!("Bad refused url: {}", err)))
}
