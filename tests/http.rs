//! End-to-end over a real socket: the accept loop on an ephemeral port.

use std::sync::Arc;

use holdco::config::Config;
use holdco::seed::Portfolio;
use holdco::server::{serve, Dashboard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn exchange(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(raw.as_bytes()).await.expect("write");
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.expect("read");
    String::from_utf8(out).expect("utf-8 response")
}

#[tokio::test]
async fn serves_requests_until_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let dashboard = Arc::new(Dashboard::new(Portfolio::seed(), Config::default()));
    let server = tokio::spawn(serve(Arc::clone(&dashboard), listener));

    let health = exchange(addr, "GET /api/health HTTP/1.1\r\nHost: test\r\n\r\n").await;
    assert!(health.starts_with("HTTP/1.1 200 OK\r\n"), "{}", health);
    assert!(health.contains("Content-Type: application/json"));
    assert!(health.contains(r#""status":"ok""#));

    let redirect = exchange(addr, "GET /state?currency=USD&return=%2Frisk HTTP/1.1\r\n\r\n").await;
    assert!(redirect.starts_with("HTTP/1.1 303 See Other\r\n"));
    assert!(redirect.contains("Location: /risk\r\n"));
    assert_eq!(dashboard.state().currency(), holdco::model::Currency::Usd);

    // A malformed head is answered and the loop keeps accepting.
    let bad = exchange(addr, "NONSENSE\r\n\r\n").await;
    assert!(bad.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", bad);

    let post = exchange(addr, "POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await;
    assert!(post.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(post.contains("Allow: GET\r\n"));

    let home = exchange(addr, "GET / HTTP/1.1\r\n\r\n").await;
    assert!(home.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(home.contains("<!DOCTYPE html>"));

    server.abort();
}
