//! Route keys.

use crate::protocol::Method;

/// The (method, path) pair a handler is bound to.
///
/// Equality and hashing are structural, so a key built fresh from an
/// incoming request finds the key stored at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.method, self.path)
    }
}
