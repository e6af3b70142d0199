//! Prefix routing table.

use std::sync::Arc;

use crate::handler::{Dispatcher, Handler};
use crate::http::request::Request;
use crate::http::response::Response;

struct Route {
    prefix: String,
    handler: Arc<dyn Handler>,
}

/// Ordered list of path prefixes, first match wins.
///
/// The `/` prefix is special: it only matches the root path itself, so it can
/// be registered last without swallowing every other request.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.add_route(prefix, Arc::new(handler));
        self
    }

    /// Registers a handler that may also be mounted under other prefixes.
    pub fn add_route(&mut self, prefix: impl Into<String>, handler: Arc<dyn Handler>) {
        self.routes.push(Route {
            prefix: prefix.into(),
            handler,
        });
    }

    /// Finds the handler for a request's routing path.
    pub fn find(&self, req: &Request) -> Option<&dyn Handler> {
        let path = match req.routing_path() {
            "" => "/",
            path => path,
        };

        self.routes
            .iter()
            .find(|route| match route.prefix.as_str() {
                "/" => path == "/",
                prefix => path.starts_with(prefix),
            })
            .map(|route| route.handler.as_ref())
    }
}

impl Dispatcher for Router {
    fn dispatch(&self, req: &Request) -> Option<Response> {
        let handler = self.find(req)?;
        let mut response = Response::new();
        handler.handle(req, &mut response);
        Some(response)
    }
}
