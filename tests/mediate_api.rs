//! End-to-end tests for the mediation endpoint over real TCP.

use std::time::Duration;

use ad_mediator::config::MediatorConfig;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn test_valid_request_returns_canned_response() {
    let server = common::start_server(MediatorConfig::default()).await;

    let res = common::client()
        .post(server.url("/mediate"))
        .body(r#"{"url": "https://ads.example.com/bid", "method": "GET", "adnet_id": 2}"#)
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert!(body["request_id"].is_i64());
    assert_eq!(body["dc_responses"]["mopub"], "some response");
    assert_eq!(body["dc_responses"]["dfp"], "some other response");

    server.stop().await;
}

#[tokio::test]
async fn test_missing_url_stops_before_payload() {
    let server = common::start_server(MediatorConfig::default()).await;

    let res = common::client()
        .post(server.url("/mediate"))
        .body(r#"{"adnet_id": 2}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let text = res.text().await.unwrap();
    assert!(text.contains("missing request URL"));
    assert!(!text.contains("request_id"), "rejection must not carry the canned payload");

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = common::start_server(MediatorConfig::default()).await;

    let res = common::client()
        .post(server.url("/mediate"))
        .body("url=https://ads.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().starts_with("malformed request body"));

    server.stop().await;
}

#[tokio::test]
async fn test_non_post_methods_get_405() {
    let server = common::start_server(MediatorConfig::default()).await;
    let client = common::client();

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let res = client
            .request(method.clone(), server.url("/mediate"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert!(res.bytes().await.unwrap().is_empty());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_body_gets_413() {
    let mut config = MediatorConfig::default();
    config.limits.max_body_bytes = 1024;
    let server = common::start_server(config).await;

    let payload = format!(r#"{{"url": "u", "body": "{}"}}"#, "a".repeat(4096));
    let res = common::client()
        .post(server.url("/mediate"))
        .body(payload)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    server.stop().await;
}

#[tokio::test]
async fn test_slow_headers_are_cut_off() {
    let mut config = MediatorConfig::default();
    config.timeouts.header_read_secs = 1;
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST /mediate HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .unwrap();

    // The header block is never finished; the server must hang up on its own.
    let mut buf = [0u8; 1024];
    let read = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    })
    .await;
    assert!(read.is_ok(), "connection should close after the header deadline");

    server.stop().await;
}

#[tokio::test]
async fn test_stalled_body_times_out_with_408() {
    let mut config = MediatorConfig::default();
    config.timeouts.request_secs = 1;
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"POST /mediate HTTP/1.1\r\nHost: localhost\r\nContent-Length: 100\r\n\r\n{\"url\"")
        .await
        .unwrap();

    // The rest of the body never arrives.
    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    let read = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
    })
    .await;
    assert!(read.is_ok(), "request deadline should produce a response");

    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 408"), "unexpected response: {text}");

    server.stop().await;
}

#[tokio::test]
async fn test_connection_lifetime_is_capped() {
    let mut config = MediatorConfig::default();
    config.timeouts.connection_secs = 1;
    config.timeouts.header_read_secs = 60;
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    // Keep-alive would hold the connection open; the lifetime cap must not.
    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => response.extend_from_slice(&buf[..n]),
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection should close once its lifetime ends");
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 200"));

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = common::start_server(MediatorConfig::default()).await;
    let addr = server.addr;

    let res = common::client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;

    assert!(TcpStream::connect(addr).await.is_err());
}
