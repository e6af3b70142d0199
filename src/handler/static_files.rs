//! Serves files from a directory on disk.

use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::handler::Handler;
use crate::http::mime::content_type_for_path;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Serves files below `root`, mapping a trailing `/` onto `index.html`.
///
/// Any path containing `..` is answered with 404 without touching the file
/// system.
#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File-system location for a routing path, `None` if it tries to escape.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        if path.contains("..") {
            return None;
        }

        let mut relative = path.replace("//", "/");
        if relative.is_empty() || relative.ends_with('/') {
            relative.push_str("index.html");
        }

        Some(self.root.join(relative.trim_start_matches('/')))
    }
}

impl Handler for StaticFileHandler {
    fn handle(&self, req: &Request, res: &mut Response) {
        let Some(file) = self.resolve(req.routing_path()) else {
            debug!(path = %req.path, "Rejected path traversal");
            *res = Response::not_found();
            return;
        };

        match std::fs::read(&file) {
            Ok(bytes) => {
                res.set_content_type(content_type_for_path(&file.to_string_lossy()));
                res.set_body(bytes);
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                *res = Response::not_found();
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Failed to read static file");
                res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                res.set_body("<h1>500 Internal Server Error</h1>");
            }
        }
    }
}
