//! Server setup and connection handling.
//!
//! # Responsibilities
//! - Bind the listener and report readiness
//! - Accept connections until shutdown
//! - Run each connection as its own task: a reader half feeds a bounded
//!   channel of inbound payloads, a worker drains it in order and writes
//!   one reply per payload
//! - Stop accepting on shutdown and let connections finish their current
//!   exchange

pub mod exchange;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use crate::config::{ConnectionConfig, ServerConfig};
use crate::crypto::Codec;
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::routing::Router;

pub use exchange::{Dispatch, ExchangeError, Pipeline};

/// How long shutdown waits for open connections to close.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encrypted request/response server.
pub struct PnpServer {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
    tracker: ConnectionTracker,
}

impl PnpServer {
    /// Create a server from a finished route table and a shared codec.
    pub fn new(config: ServerConfig, router: Router, codec: Arc<dyn Codec>) -> Self {
        tracing::info!(routes = router.len(), "Route table frozen");
        Self {
            config,
            pipeline: Arc::new(Pipeline::new(Arc::new(router), codec)),
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle on the live connection count.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Bind `port` on the configured host, call `on_ready` with the bound
    /// address, then serve until `shutdown` fires.
    ///
    /// Bind failures are returned to the caller and never retried.
    pub async fn listen<F>(
        mut self,
        port: u16,
        on_ready: F,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError>
    where
        F: FnOnce(SocketAddr),
    {
        self.config.listener.port = port;
        let listener = Listener::bind(&self.config.listener).await?;
        on_ready(listener.local_addr()?);
        self.serve(listener, shutdown).await
    }

    /// Accept connections on an already bound listener until `shutdown` fires.
    pub async fn serve(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        tracing::info!(address = %listener.local_addr()?, "Server accepting connections");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => self.spawn_connection(stream, peer, permit, &shutdown),
                    Err(ListenerError::Accept(e)) => {
                        tracing::warn!(error = %e, "Accept failed");
                    }
                    Err(e) => return Err(e.into()),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        if !self.tracker.wait_for_drain(DRAIN_TIMEOUT).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Connections still open after drain timeout"
            );
        }
        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        permit: ConnectionPermit,
        shutdown: &broadcast::Receiver<()>,
    ) {
        let guard = self.tracker.track();
        let span = tracing::info_span!("connection", connection_id = %guard.id(), peer = %peer);
        let pipeline = Arc::clone(&self.pipeline);
        let config = self.config.connection.clone();
        let shutdown = shutdown.resubscribe();

        tokio::spawn(
            async move {
                handle_connection(stream, pipeline, config, shutdown, guard).await;
                drop(permit);
            }
            .instrument(span),
        );
    }
}

/// Drive one connection until the peer closes, a frame fails to decrypt,
/// or shutdown fires.
async fn handle_connection(
    stream: TcpStream,
    pipeline: Arc<Pipeline>,
    config: ConnectionConfig,
    mut shutdown: broadcast::Receiver<()>,
    _guard: ConnectionGuard,
) {
    tracing::debug!("Connection opened");
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::channel(config.inbound_queue_depth);
    let reader_task = tokio::spawn(read_payloads(reader, config.read_buffer_size, tx).in_current_span());

    loop {
        tokio::select! {
            payload = rx.recv() => {
                let Some(frame) = payload else { break };
                match pipeline.process(&frame) {
                    Ok(reply) => {
                        if let Err(e) = writer.write_all(&reply).await {
                            tracing::debug!(error = %e, "Write failed, closing connection");
                            break;
                        }
                    }
                    Err(ExchangeError::Decrypt(_)) => {
                        tracing::debug!("Closing connection after undecryptable frame");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Exchange dropped");
                    }
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Closing connection for shutdown");
                break;
            }
        }
    }

    reader_task.abort();
    let _ = writer.shutdown().await;
    tracing::debug!("Connection finished");
}

/// Read chunks off the socket, each one a whole envelope, and queue them in
/// arrival order.
async fn read_payloads(mut reader: OwnedReadHalf, buffer_size: usize, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; buffer_size];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Read failed");
                break;
            }
        }
    }
}
