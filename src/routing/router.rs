//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the route table
//! - Look up the handler for a request by exact (method, path)
//! - Invoke it, or fill in the Not Found fallback
//!
//! # Design Decisions
//! - Immutable once handed to the server (shared via Arc, no locks)
//! - O(1) lookup via HashMap on a value key
//! - Explicit outcome returned so callers can log and count

use std::collections::HashMap;
use std::sync::Arc;

use crate::protocol::{status, Method, Request, Response};
use crate::routing::handler::Handler;
use crate::routing::route::RouteKey;

/// Body sent when no route matches.
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Result of routing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A handler was found and invoked.
    Matched,
    /// No handler is registered for the request's key.
    NotFound,
}

/// Table of (method, path) → handler.
#[derive(Default, Clone)]
pub struct Router {
    routes: HashMap<RouteKey, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a key. A previous handler under the same key is
    /// replaced. `Method::Unknown` can never be matched, so such
    /// registrations are refused with a warning.
    pub fn register<H: Handler>(&mut self, method: Method, path: impl Into<String>, handler: H) -> &mut Self {
        let key = RouteKey::new(method, path);
        if method == Method::Unknown {
            tracing::warn!(route = %key, "Refusing route with unknown method");
            return self;
        }
        if self.routes.insert(key.clone(), Arc::new(handler)).is_some() {
            tracing::debug!(route = %key, "Route redefined");
        } else {
            tracing::debug!(route = %key, "Route registered");
        }
        self
    }

    pub fn get<H: Handler>(&mut self, path: impl Into<String>, handler: H) -> &mut Self {
        self.register(Method::Get, path, handler)
    }

    pub fn post<H: Handler>(&mut self, path: impl Into<String>, handler: H) -> &mut Self {
        self.register(Method::Post, path, handler)
    }

    pub fn put<H: Handler>(&mut self, path: impl Into<String>, handler: H) -> &mut Self {
        self.register(Method::Put, path, handler)
    }

    pub fn delete<H: Handler>(&mut self, path: impl Into<String>, handler: H) -> &mut Self {
        self.register(Method::Delete, path, handler)
    }

    /// Find the handler bound to a request, if any.
    pub fn lookup(&self, request: &Request) -> Option<&Arc<dyn Handler>> {
        if request.method == Method::Unknown {
            return None;
        }
        let key = RouteKey::new(request.method, request.path.as_str());
        self.routes.get(&key)
    }

    /// Dispatch a request, filling in `response`.
    ///
    /// A matched handler is invoked exactly once. Otherwise the response
    /// becomes a 404 with a fixed body and no handler runs.
    pub fn route(&self, request: &Request, response: &mut Response) -> RouteOutcome {
        match self.lookup(request) {
            Some(handler) => {
                handler.call(request, response);
                RouteOutcome::Matched
            }
            None => {
                response.status = status::NOT_FOUND;
                response.body = NOT_FOUND_BODY.to_string();
                RouteOutcome::NotFound
            }
        }
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.routes.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("Router").field("routes", &keys).finish()
    }
}
