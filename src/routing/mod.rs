//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request (method, path)
//!     → RouteKey (value type)
//!     → router.rs (exact lookup in the route table)
//!     → handler.rs (invoke bound handler against the Response)
//!     → or the Not Found fallback
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving
//! - Keys compared by value: same (method, path) always finds the same handler
//! - Re-registering a key replaces the earlier handler
//! - No wildcards or prefixes, exact match only

pub mod handler;
pub mod route;
pub mod router;

pub use handler::Handler;
pub use route::RouteKey;
pub use router::{RouteOutcome, Router};
