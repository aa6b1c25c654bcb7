//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;

use pnp_server::config::ServerConfig;
use pnp_server::crypto::{AesGcmCodec, Codec, CodecKey};
use pnp_server::net::ConnectionTracker;
use pnp_server::{PnpServer, Router, Shutdown};
use tokio::sync::oneshot;

/// Key shared by test servers and clients.
pub fn test_codec() -> Arc<dyn Codec> {
    Arc::new(AesGcmCodec::new(&CodecKey::from_bytes([0x5A; 32])))
}

/// A running server. Dropping it shuts the server down.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
    pub handle: tokio::task::JoinHandle<()>,
}

/// Start a server on an ephemeral loopback port with the given routes.
pub async fn start_server(router: Router) -> TestServer {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.max_connections = 64;

    let shutdown = Shutdown::new();
    let server = PnpServer::new(config, router, test_codec());
    let tracker = server.tracker();
    let server_shutdown = shutdown.subscribe();
    let (ready_tx, ready_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        server
            .listen(0, move |addr| {
                let _ = ready_tx.send(addr);
            }, server_shutdown)
            .await
            .unwrap();
    });

    let addr = ready_rx.await.expect("server never became ready");
    TestServer {
        addr,
        shutdown,
        tracker,
        handle,
    }
}
