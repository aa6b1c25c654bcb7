//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind host, port, limits).
    pub listener: ListenerConfig,

    /// Per-connection I/O settings.
    pub connection: ConnectionConfig,

    /// Payload encryption settings.
    pub crypto: CryptoConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. 0 asks the OS for an ephemeral port.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// The socket address described by `host` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7878,
            max_connections: 1024,
        }
    }
}

/// Per-connection I/O configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Size of the read buffer. Each read is treated as one whole envelope,
    /// so this also caps the largest accepted frame.
    pub read_buffer_size: usize,

    /// Inbound payloads buffered per connection before reads pause.
    pub inbound_queue_depth: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 64 * 1024,
            inbound_queue_depth: 32,
        }
    }
}

/// Payload encryption configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CryptoConfig {
    /// Shared AES-256 key as 64 hex characters.
    pub key: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str("[listener]\nport = 9000\n").unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.connection.read_buffer_size, 64 * 1024);
        assert!(config.crypto.key.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn socket_addr_joins_host_and_port() {
        let listener = ListenerConfig {
            host: "127.0.0.1".into(),
            port: 4000,
            max_connections: 1,
        };
        assert_eq!(listener.socket_addr().unwrap(), "127.0.0.1:4000".parse().unwrap());
    }
}
