//! Client for the encrypted envelope protocol.
//!
//! Sends one request at a time over a single connection and waits for the
//! matching reply, which keeps each write a whole envelope on the server side.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::crypto::{Codec, DecryptionError, EncryptionError};
use crate::protocol::{self, DecodeError, EncodeError, Request, Response};

/// Largest reply frame the client will read.
const MAX_REPLY_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server closed the connection without replying")]
    Closed,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Encrypt(#[from] EncryptionError),

    #[error("reply could not be decrypted: {0}")]
    Decrypt(#[from] DecryptionError),

    #[error("reply is not a valid response: {0}")]
    Decode(#[from] DecodeError),
}

/// A connection to a server sharing this client's key.
pub struct PnpClient {
    stream: TcpStream,
    codec: Arc<dyn Codec>,
}

impl PnpClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A, codec: Arc<dyn Codec>) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, codec })
    }

    /// Send a request and wait for its response.
    pub async fn send(&mut self, request: &Request) -> Result<Response, ClientError> {
        let payload = protocol::encode_request(request)?;
        let reply = self.exchange(&payload).await?;
        Ok(protocol::decode_response(&reply)?)
    }

    /// Encrypt an arbitrary payload, send it, and return the decrypted reply.
    pub async fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>, ClientError> {
        let frame = self.codec.encrypt(payload)?;
        self.stream.write_all(&frame).await?;

        let mut buf = vec![0u8; MAX_REPLY_LEN];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            return Err(ClientError::Closed);
        }
        Ok(self.codec.decrypt(&buf[..n])?)
    }
}
