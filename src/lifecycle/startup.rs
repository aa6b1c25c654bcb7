//! Startup orchestration helpers.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_config, ConfigError, CryptoConfig, ServerConfig};
use crate::crypto::{AesGcmCodec, Codec, CodecKey, KeyError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no encryption key configured (set crypto.key or pass --key)")]
    MissingKey,

    #[error("invalid encryption key: {0}")]
    Key(#[from] KeyError),
}

/// Load the config file if one was given, otherwise use defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<ServerConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(ServerConfig::default()),
    }
}

/// Build the shared codec from configured key material.
pub fn codec_from_config(config: &CryptoConfig) -> Result<Arc<dyn Codec>, StartupError> {
    if config.key.trim().is_empty() {
        return Err(StartupError::MissingKey);
    }
    let key = CodecKey::from_hex(&config.key)?;
    Ok(Arc::new(AesGcmCodec::new(&key)))
}
