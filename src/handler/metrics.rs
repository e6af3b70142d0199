//! Live server metrics as JSON.

use std::sync::Arc;

use crate::handler::Handler;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::stats::ConnectionStats;

pub const METRICS_PATH: &str = "/api/metrics";

/// Answers `/api/metrics` with a snapshot of the connection counters.
#[derive(Debug, Clone)]
pub struct MetricsHandler {
    stats: Arc<ConnectionStats>,
}

impl MetricsHandler {
    pub fn new(stats: Arc<ConnectionStats>) -> Self {
        Self { stats }
    }
}

impl Handler for MetricsHandler {
    fn handle(&self, req: &Request, res: &mut Response) {
        let path = req.routing_path();
        if path.strip_suffix('/').unwrap_or(path) != METRICS_PATH {
            *res = Response::not_found();
            return;
        }

        match serde_json::to_vec(&self.stats.snapshot()) {
            Ok(json) => {
                res.set_content_type("application/json; charset=utf-8");
                res.set_body(json);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode metrics");
                *res = Response::internal_error();
            }
        }
    }
}
