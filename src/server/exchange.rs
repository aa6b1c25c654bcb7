//! The per-payload exchange pipeline.
//!
//! ```text
//! frame → decrypt → decode → route → encode → encrypt → reply frame
//! ```
//!
//! Decode failures degrade to a default request so the peer still gets a
//! structured (404) reply. Handler panics are caught and become a 500.
//! Decryption failures end the exchange with no reply at all.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use crate::crypto::{Codec, DecryptionError, EncryptionError};
use crate::observability::metrics;
use crate::protocol::{self, status, EncodeError, Request, Response};
use crate::routing::{RouteOutcome, Router};

/// Body sent when a handler fails.
pub const HANDLER_FAILURE_BODY: &str = "Internal Server Error";

/// Reasons an exchange produced no reply frame.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Decrypt(#[from] DecryptionError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Encrypt(#[from] EncryptionError),
}

/// How the router handled a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Routed(RouteOutcome),
    HandlerFailed,
}

/// Shared, read-only pipeline state: the route table and the codec.
pub struct Pipeline {
    router: Arc<Router>,
    codec: Arc<dyn Codec>,
}

impl Pipeline {
    pub fn new(router: Arc<Router>, codec: Arc<dyn Codec>) -> Self {
        Self { router, codec }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run one inbound frame through the full pipeline and return the
    /// encrypted reply.
    pub fn process(&self, frame: &[u8]) -> Result<Vec<u8>, ExchangeError> {
        let start = Instant::now();
        let exchange_id = Uuid::new_v4();
        let span = tracing::debug_span!("exchange", exchange_id = %exchange_id);
        let _entered = span.enter();

        let plaintext = self.codec.decrypt(frame).map_err(|e| {
            metrics::record_decrypt_failure();
            tracing::warn!(error = %e, frame_len = frame.len(), "Dropping undecryptable frame");
            e
        })?;

        let request = protocol::decode(&plaintext).unwrap_or_else(|e| {
            metrics::record_decode_failure();
            tracing::warn!(error = %e, "Malformed envelope, using default request");
            Request::default()
        });

        let (response, dispatch) = self.dispatch(&request);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            dispatch = ?dispatch,
            "Request handled"
        );

        let encoded = protocol::encode(&response)?;
        let reply = self.codec.encrypt(&encoded)?;

        metrics::record_exchange(request.method.as_str(), response.status, start);
        Ok(reply)
    }

    /// Route a request against a fresh default response.
    pub fn dispatch(&self, request: &Request) -> (Response, Dispatch) {
        let mut response = Response::default();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.router.route(request, &mut response)));

        match result {
            Ok(outcome) => (response, Dispatch::Routed(outcome)),
            Err(payload) => {
                tracing::error!(
                    method = %request.method,
                    path = %request.path,
                    panic = panic_message(payload.as_ref()),
                    "Handler panicked"
                );
                let mut failed = Response::default();
                failed.set_status(status::INTERNAL_SERVER_ERROR).set_body(HANDLER_FAILURE_BODY);
                (failed, Dispatch::HandlerFailed)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}
