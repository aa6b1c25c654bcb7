//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (lifecycle tracking, IDs for tracing)
//!     → Hand off to the server's per-connection task
//! ```
//!
//! # Design Decisions
//! - Bounded accept (semaphore) prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - No TLS: payload confidentiality comes from the codec

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
