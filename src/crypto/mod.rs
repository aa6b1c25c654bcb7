//! Payload encryption subsystem.
//!
//! # Data Flow
//! ```text
//! inbound bytes  → Codec::decrypt → plaintext envelope
//! outbound bytes ← Codec::encrypt ← plaintext envelope
//! ```
//!
//! # Design Decisions
//! - One codec instance is shared read-only by every connection
//! - Passed explicitly to the server, never held in a global
//! - Decryption failures are final for the exchange, never retried

pub mod codec;
pub mod key;

pub use codec::{AesGcmCodec, Codec, DecryptionError, EncryptionError};
pub use key::{CodecKey, KeyError};
