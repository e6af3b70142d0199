use hearth::http::request::{Method, Request, RequestBuilder};
use std::collections::HashMap;

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("Host".to_string(), "example.com".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    let req = Request {
        method: Method::GET,
        path: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: vec![],
    };

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("host"), None);
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_builder_defaults() {
    let req = RequestBuilder::new().build();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/");
    assert_eq!(req.version, "HTTP/1.1");
    assert!(req.headers.is_empty());
    assert!(req.body.is_empty());
}

#[test]
fn test_builder_empty_parts_fall_back_to_defaults() {
    let req = RequestBuilder::new()
        .method(Method::Extension(String::new()))
        .path("")
        .version("")
        .build();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/");
    assert_eq!(req.version, "HTTP/1.1");
}

#[test]
fn test_routing_path_strips_query() {
    let req = RequestBuilder::new().path("/topics/generics?tab=2&x=1").build();

    assert_eq!(req.routing_path(), "/topics/generics");
    assert_eq!(req.query(), Some("tab=2&x=1"));
}

#[test]
fn test_routing_path_without_query() {
    let req = RequestBuilder::new().path("/css/site.css").build();

    assert_eq!(req.routing_path(), "/css/site.css");
    assert_eq!(req.query(), None);
}

#[test]
fn test_routing_path_of_bare_query() {
    let req = RequestBuilder::new().path("?only").build();

    assert_eq!(req.routing_path(), "");
}

#[test]
fn test_method_display_round_trips_token() {
    for token in ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "BREW"] {
        assert_eq!(Method::parse(token).to_string(), token);
    }
}
