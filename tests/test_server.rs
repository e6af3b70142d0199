//! End-to-end tests over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hearth::handler::{Dispatcher, MetricsHandler, Router};
use hearth::http::request::Request;
use hearth::http::response::Response;
use hearth::http::stats::ConnectionStats;
use hearth::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    stats: Arc<ConnectionStats>,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start(max_connections: usize) -> TestServer {
    let stats = Arc::new(ConnectionStats::new());
    let router = Router::new()
        .route("/api/", MetricsHandler::new(Arc::clone(&stats)))
        .route("/echo", |req: &Request, res: &mut Response| {
            res.set_content_type("text/plain");
            res.set_body(req.body.clone());
        })
        .route("/", |_req: &Request, res: &mut Response| {
            res.set_body("<h1>home</h1>");
        });
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(router);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener, max_connections, dispatcher, Arc::clone(&stats));
    let addr = server.local_addr().unwrap();

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        let _ = stopped.await;
    }));

    TestServer { addr, stats, stop, handle }
}

/// Sends the request in pieces and reads until the server closes.
async fn exchange(addr: SocketAddr, pieces: &[&str]) -> String {
    let mut client = TcpStream::connect(addr).await.unwrap();
    for piece in pieces {
        client.write_all(piece.as_bytes()).await.unwrap();
        client.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut response))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_root_page() {
    let server = start(16).await;

    let response = exchange(server.addr, &["GET / HTTP/1.1\r\nHost: x\r\n\r\n"]).await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("\r\nConnection: close\r\n"));
    assert!(response.contains("\r\nContent-Length: 13\r\n"));
    assert!(response.ends_with("\r\n\r\n<h1>home</h1>"));
}

#[tokio::test]
async fn test_missing_route() {
    let server = start(16).await;

    let response = exchange(server.addr, &["GET /missing HTTP/1.1\r\nHost: x\r\n\r\n"]).await;

    assert!(response.starts_with("HTTP/1.1 404 Not Found"));
    assert!(response.ends_with("\r\n\r\n<h1>404 Not Found</h1>"));
}

#[tokio::test]
async fn test_body_sent_in_three_pieces() {
    let server = start(16).await;

    let response = exchange(
        server.addr,
        &[
            "POST /echo HTTP/1.1\r\nContent-Le",
            "ngth: 5\r\n\r\nhe",
            "llo",
        ],
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("\r\nContent-Type: text/plain\r\n"));
    assert!(response.ends_with("\r\n\r\nhello"));
}

#[tokio::test]
async fn test_malformed_request_line() {
    let server = start(16).await;

    let response = exchange(server.addr, &["GET\r\n\r\n"]).await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_concurrent_clients_are_independent() {
    let server = start(4).await;

    // Holds a connection open with half a request while others complete.
    let mut slow = TcpStream::connect(server.addr).await.unwrap();
    slow.write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\n\r\nab").await.unwrap();

    let mut clients = Vec::new();
    for i in 0..8 {
        let addr = server.addr;
        clients.push(tokio::spawn(async move {
            let body = format!("client-{}", i);
            let request = format!(
                "POST /echo HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            let response = exchange(addr, &[request.as_str()]).await;
            assert!(response.ends_with(&body), "{}", response);
        }));
    }
    for client in clients {
        client.await.unwrap();
    }

    slow.write_all(b"cd").await.unwrap();
    let mut response = String::new();
    slow.read_to_string(&mut response).await.unwrap();
    assert!(response.ends_with("\r\n\r\nabcd"));
}

#[tokio::test]
async fn test_metrics_endpoint_counts_connections() {
    let server = start(16).await;

    exchange(server.addr, &["GET / HTTP/1.1\r\n\r\n"]).await;
    let response = exchange(server.addr, &["GET /api/metrics HTTP/1.1\r\n\r\n"]).await;

    assert!(response.contains("Content-Type: application/json; charset=utf-8"));
    let body = response.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["connectionsAccepted"], 2);
    assert_eq!(json["responses2xx"], 1);
    assert_eq!(server.stats.snapshot().requests_parsed, 2);
}

#[tokio::test]
async fn test_stop_signal_ends_accept_loop() {
    let server = start(16).await;

    // An idle connection must not keep the server alive.
    let _idle = TcpStream::connect(server.addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    server.stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    assert_eq!(server.stats.snapshot().active_connections, 0);
}
