//! # End-to-End Tests
//!
//! A real listener serving an access-logged router, exercised over loopback
//! through the counting transport.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use reqwest::{Method, Request, Url};
use tempfile::TempDir;
use tokio::net::TcpListener;

use traffic_log::client::{CountingTransport, RoundTrip};
use traffic_log::core::config::AccessLogConfig;
use traffic_log::middleware::AccessLogLayer;

async fn serve(config: AccessLogConfig) -> SocketAddr {
    let app = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/gone", get(|| async { (StatusCode::GONE, "gone for good") }))
        .layer(AccessLogLayer::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

/// Loopback client that ignores any proxy settings in the environment
fn loopback_transport() -> CountingTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    CountingTransport::with_transport(client).verbose(true)
}

async fn wait_for_lines(dir: &TempDir, expected: usize) -> Vec<String> {
    for _ in 0..200 {
        let lines: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .flat_map(|entry| {
                std::fs::read_to_string(entry.unwrap().path())
                    .unwrap()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if lines.len() >= expected {
            return lines;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} access log lines", expected);
}

#[tokio::test]
async fn test_counting_transport_against_logged_server() {
    let dir = TempDir::new().unwrap();
    let addr = serve(AccessLogConfig::new(dir.path(), false)).await;
    let transport = loopback_transport();

    let ping = Url::parse(&format!("http://{}/ping", addr)).unwrap();
    let gone = Url::parse(&format!("http://{}/gone", addr)).unwrap();

    let response = transport.round_trip(Request::new(Method::GET, ping)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "pong");

    let response = transport.round_trip(Request::new(Method::GET, gone)).await.unwrap();
    assert_eq!(response.status().as_u16(), 410);
    assert_eq!(response.text().await.unwrap(), "gone for good");

    assert_eq!(transport.requests(), 2);

    let mut lines = wait_for_lines(&dir, 2).await;
    lines.sort_by_key(|line| line.contains("/gone"));

    assert!(lines[0].starts_with("127.0.0.1 - - ["));
    assert!(lines[0].contains("\"GET /ping HTTP/1.1\" 200 4 \"\" \"\""));
    assert!(lines[1].contains("\"GET /gone HTTP/1.1\" 410 13 "));
}

#[tokio::test]
async fn test_default_client_transport() {
    // The shared default client honours proxy variables; keep loopback direct.
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let dir = TempDir::new().unwrap();
    let addr = serve(AccessLogConfig::new(dir.path(), false)).await;
    let transport = CountingTransport::new();

    let ping = Url::parse(&format!("http://{}/ping", addr)).unwrap();
    for expected in 1..=3 {
        let response = transport
            .round_trip(Request::new(Method::GET, ping.clone()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "pong");
        assert_eq!(transport.requests(), expected);
    }

    let lines = wait_for_lines(&dir, 3).await;
    assert_eq!(lines.len(), 3);
    assert!(lines
        .iter()
        .all(|line| line.contains("\"GET /ping HTTP/1.1\" 200 4 ")));
}

#[tokio::test]
async fn test_failed_round_trip_still_counted() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = loopback_transport();
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();

    let err = transport
        .round_trip(Request::new(Method::GET, url))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<reqwest::Error>().is_some());
    assert_eq!(transport.requests(), 1);
}
