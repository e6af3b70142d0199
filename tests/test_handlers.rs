use std::path::PathBuf;
use std::sync::Arc;

use hearth::handler::{Handler, MetricsHandler, StaticFileHandler};
use hearth::http::mime::{DEFAULT_MIME, content_type_for_extension, content_type_for_path};
use hearth::http::request::RequestBuilder;
use hearth::http::response::{Response, StatusCode};
use hearth::http::stats::ConnectionStats;

fn web_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("hearth-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("css")).unwrap();
    std::fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    std::fs::write(root.join("css").join("site.css"), "body{}").unwrap();
    root
}

fn serve(handler: &impl Handler, path: &str) -> Response {
    let req = RequestBuilder::new().path(path).build();
    let mut res = Response::new();
    handler.handle(&req, &mut res);
    res
}

#[test]
fn test_mime_by_extension() {
    assert_eq!(content_type_for_extension("html"), "text/html; charset=utf-8");
    assert_eq!(content_type_for_extension(".CSS"), "text/css; charset=utf-8");
    assert_eq!(content_type_for_extension("JPEG"), "image/jpeg");
    assert_eq!(content_type_for_extension("svg"), "image/svg+xml");
    assert_eq!(content_type_for_extension(""), DEFAULT_MIME);
    assert_eq!(content_type_for_extension("wasm"), DEFAULT_MIME);
}

#[test]
fn test_mime_by_path() {
    assert_eq!(content_type_for_path("web/js/landing.js"), "application/javascript; charset=utf-8");
    assert_eq!(content_type_for_path("web/favicon.ico"), "image/x-icon");
    assert_eq!(content_type_for_path("web/README"), DEFAULT_MIME);
    assert_eq!(content_type_for_path("web/trailing."), DEFAULT_MIME);
    assert_eq!(content_type_for_path("web.d/file"), DEFAULT_MIME);
}

#[test]
fn test_static_serves_index_for_root() {
    let root = web_root("index");
    let handler = StaticFileHandler::new(&root);

    let res = serve(&handler, "/");
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, b"<h1>home</h1>".to_vec());
    assert_eq!(res.header("Content-Type"), Some("text/html; charset=utf-8"));
}

#[test]
fn test_static_serves_nested_file_with_content_type() {
    let root = web_root("nested");
    let handler = StaticFileHandler::new(&root);

    let res = serve(&handler, "/css//site.css?v=3");
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, b"body{}".to_vec());
    assert_eq!(res.header("Content-Type"), Some("text/css; charset=utf-8"));
}

#[test]
fn test_static_missing_file_is_404() {
    let root = web_root("missing");
    let handler = StaticFileHandler::new(&root);

    assert_eq!(serve(&handler, "/nope.html"), Response::not_found());
}

#[test]
fn test_static_directory_without_index_is_404() {
    let root = web_root("dir");
    let handler = StaticFileHandler::new(&root);

    assert_eq!(serve(&handler, "/css/").status, StatusCode::NOT_FOUND);
}

#[test]
fn test_static_rejects_traversal() {
    let handler = StaticFileHandler::new("/srv/web");

    assert_eq!(handler.resolve("/../etc/passwd"), None);
    assert_eq!(serve(&handler, "/css/../../secret"), Response::not_found());
}

#[test]
fn test_static_resolve() {
    let handler = StaticFileHandler::new("/srv/web");

    assert_eq!(handler.resolve("/"), Some(PathBuf::from("/srv/web/index.html")));
    assert_eq!(handler.resolve("/js/"), Some(PathBuf::from("/srv/web/js/index.html")));
    assert_eq!(handler.resolve("//js//a.js"), Some(PathBuf::from("/srv/web/js/a.js")));
}

#[test]
fn test_metrics_reports_stats_as_json() {
    let stats = Arc::new(ConnectionStats::new());
    stats.connection_opened();
    stats.bytes_read(42);
    let handler = MetricsHandler::new(Arc::clone(&stats));

    let res = serve(&handler, "/api/metrics/");
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("Content-Type"), Some("application/json; charset=utf-8"));

    let json: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(json["connectionsAccepted"], 1);
    assert_eq!(json["activeConnections"], 1);
    assert_eq!(json["bytesRead"], 42);
}

#[test]
fn test_metrics_unknown_path_is_404() {
    let handler = MetricsHandler::new(Arc::new(ConnectionStats::new()));

    assert_eq!(serve(&handler, "/api/other"), Response::not_found());
}
