//! Envelope protocol subsystem.
//!
//! # Data Flow
//! ```text
//! decrypted payload (JSON)
//!     → serializer::decode → Request
//!     → routing
//!     → Response → serializer::encode
//!     → payload for encryption
//! ```
//!
//! # Design Decisions
//! - Envelopes are typed structs, absent fields fall back to defaults
//! - Headers use an ordered map so encoded output is deterministic
//! - Peer-side helpers live here too so clients share the exact format

pub mod envelope;
pub mod serializer;

pub use envelope::{status, Headers, Method, Request, Response};
pub use serializer::{decode, decode_response, encode, encode_request, DecodeError, EncodeError};
