//! AES-256-GCM payload codec.
//!
//! # Wire Layout
//! ```text
//! ┌──────────────┬─────────────────────┬──────────────┐
//! │ nonce (12 B) │ ciphertext (n B)    │ tag (16 B)   │
//! └──────────────┴─────────────────────┴──────────────┘
//! ```
//!
//! A fresh random nonce is drawn for every encryption, so encrypting the
//! same plaintext twice yields different frames.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use thiserror::Error;

use crate::crypto::key::CodecKey;

/// Nonce length for AES-GCM.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length for AES-GCM.
pub const TAG_LEN: usize = 16;

/// Errors raised when a frame cannot be decrypted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptionError {
    /// The frame is too short to hold a nonce and a tag.
    #[error("frame truncated: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    /// Tag verification failed (wrong key or corrupted frame).
    #[error("frame failed authentication")]
    Authentication,
}

/// Errors raised when a payload cannot be encrypted.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("payload of {len} bytes could not be encrypted")]
pub struct EncryptionError {
    pub len: usize,
}

/// Symmetric encryption of wire payloads.
///
/// Implementations hold only read-only key material and are shared across
/// all connections.
pub trait Codec: Send + Sync {
    /// Encrypt a plaintext payload into a wire frame.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError>;

    /// Decrypt a wire frame back into its plaintext payload.
    fn decrypt(&self, frame: &[u8]) -> Result<Vec<u8>, DecryptionError>;
}

/// AES-256-GCM codec with a random nonce per frame.
pub struct AesGcmCodec {
    cipher: Aes256Gcm,
}

impl AesGcmCodec {
    pub fn new(key: &CodecKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }
}

impl std::fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCodec").finish_non_exhaustive()
    }
}

impl Codec for AesGcmCodec {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| EncryptionError { len: plaintext.len() })?;

        let mut frame = Vec::with_capacity(NONCE_LEN + sealed.len());
        frame.extend_from_slice(&nonce_bytes);
        frame.extend_from_slice(&sealed);
        Ok(frame)
    }

    fn decrypt(&self, frame: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        let min = NONCE_LEN + TAG_LEN;
        if frame.len() < min {
            return Err(DecryptionError::Truncated { len: frame.len(), min });
        }

        let (nonce_bytes, sealed) = frame.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| DecryptionError::Authentication)
    }
}
