//! Symmetric key material.

use rand::RngCore;
use thiserror::Error;

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Errors raised while parsing key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key was not valid hexadecimal.
    #[error("key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The key decoded to the wrong number of bytes.
    #[error("key must be 32 bytes, got {0}")]
    Length(usize),
}

/// A 256-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct CodecKey([u8; KEY_LEN]);

impl CodecKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 64 hex characters.
    pub fn from_hex(encoded: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(encoded.trim())?;
        let array: [u8; KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        Ok(Self(array))
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Hex encoding of the key, suitable for config files.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for CodecKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CodecKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let key = CodecKey::generate();
        let parsed = CodecKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn rejects_short_key() {
        let err = CodecKey::from_hex("abcd").unwrap_err();
        assert!(matches!(err, KeyError::Length(2)));
    }

    #[test]
    fn rejects_non_hex() {
        let err = CodecKey::from_hex(&"zz".repeat(32)).unwrap_err();
        assert!(matches!(err, KeyError::Hex(_)));
    }

    #[test]
    fn debug_hides_material() {
        let key = CodecKey::from_bytes([0xAB; KEY_LEN]);
        let printed = format!("{:?}", key);
        assert!(!printed.contains("ab"));
        assert!(printed.contains("redacted"));
    }
}
