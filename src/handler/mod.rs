//! Request handlers and the dispatcher boundary.
//!
//! The connection engine only knows the [`Dispatcher`] trait: given a parsed
//! request it either produces a response or reports that nothing matched, in
//! which case the engine answers with a 404 itself. [`Router`] is the
//! dispatcher used by the binary, mapping path prefixes onto [`Handler`]s.
//!
//! Dispatch runs inline on the connection's task. Handlers are expected to be
//! quick; a slow handler holds up its connection and, while it runs, the
//! worker thread it occupies.

pub mod metrics;
pub mod router;
pub mod static_files;

use crate::http::request::Request;
use crate::http::response::Response;

pub use metrics::MetricsHandler;
pub use router::Router;
pub use static_files::StaticFileHandler;

/// Fills in a response for a request.
///
/// The response starts out as [`Response::new`]: status 200, an HTML content
/// type and an empty body.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response) {
        self(req, res)
    }
}

/// Maps a request onto a response, `None` when no handler matched.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, req: &Request) -> Option<Response>;
}
