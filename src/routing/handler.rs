//! Route handlers.

use crate::protocol::{Request, Response};

/// A function bound to a route.
///
/// Handlers run synchronously on the connection's task and fill in the
/// response in place. They must not block.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: &Request, response: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn call(&self, request: &Request, response: &mut Response) {
        self(request, response)
    }
}
