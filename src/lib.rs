//! Encrypted request/response protocol server library.

pub mod client;
pub mod config;
pub mod crypto;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod routing;
pub mod server;

pub use config::ServerConfig;
pub use lifecycle::Shutdown;
pub use protocol::{Method, Request, Response};
pub use routing::Router;
pub use server::PnpServer;
