//! Envelope encoding and decoding.
//!
//! The server side decodes requests and encodes responses. The peer side
//! (`encode_request` / `decode_response`) is the mirror image used by
//! clients.

use thiserror::Error;

use crate::protocol::envelope::{Request, Response};

/// The payload was not a well-formed envelope document.
#[derive(Debug, Error)]
#[error("malformed envelope: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// An envelope could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode envelope: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Decode a decrypted payload into a request.
///
/// Absent or `null` fields take their defaults, and a mistyped `headers`
/// or `body` falls back to empty without touching the other fields. A
/// payload that is not a JSON object, or whose `method` or `path` is not a
/// string, is an error.
pub fn decode(payload: &[u8]) -> Result<Request, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Encode a response into a payload ready for encryption.
pub fn encode(response: &Response) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(response)?)
}

/// Encode a request on the client side.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(request)?)
}

/// Decode a response on the client side.
pub fn decode_response(payload: &[u8]) -> Result<Response, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}
