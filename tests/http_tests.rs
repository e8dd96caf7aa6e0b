//! Tests for HTTP module functionality.

use futures::StreamExt;
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use steadyfetch::http::client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
use steadyfetch::http::{HttpTransport, Transport};
use steadyfetch::utils::ContentRange;

mod common;
use common::helpers::*;

async fn collect_body(response: steadyfetch::TransferResponse) -> Vec<u8> {
    let mut body = response.body;
    let mut buffer = Vec::new();
    while let Some(chunk) = body.next().await {
        buffer.extend_from_slice(&chunk.unwrap());
    }
    buffer
}

fn test_transport() -> HttpTransport {
    HttpTransport::new(HttpClientConfig {
        user_agent: TEST_USER_AGENT.to_string(),
        headers: None,
    })
    .unwrap()
}

#[test]
fn test_default_config() {
    let config = HttpClientConfig::default();
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert!(config.headers.is_none());
}

#[test]
fn test_create_http_client_default() {
    let config = HttpClientConfig::default();
    let client = create_http_client(config);
    assert!(client.is_ok());
}

#[test]
fn test_create_http_client_with_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    let config = HttpClientConfig {
        user_agent: TEST_USER_AGENT.to_string(),
        headers: Some(headers),
    };
    assert!(create_http_client(config).is_ok());
}

#[test]
fn test_create_http_client_rejects_invalid_agent() {
    let config = HttpClientConfig {
        user_agent: "bad\r\nagent".to_string(),
        headers: None,
    };
    assert!(create_http_client(config).is_err());
}

#[tokio::test]
async fn test_head_reads_metadata() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(HEAD)
                .path("/file.bin")
                .header("user-agent", TEST_USER_AGENT);
            then.status(200)
                .header("content-length", "1000")
                .header("accept-ranges", "bytes");
        })
        .await;

    let url = Url::parse(&server.url("/file.bin")).unwrap();
    let probe = test_transport().head(&url).await.unwrap();

    mock.assert_async().await;
    assert!(probe.is_success());
    assert_eq!(probe.content_length, Some(1000));
    assert!(probe.accept_ranges);
}

#[tokio::test]
async fn test_head_without_range_support() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/file.bin");
            then.status(200).header("content-length", "10");
        })
        .await;

    let url = Url::parse(&server.url("/file.bin")).unwrap();
    let probe = test_transport().head(&url).await.unwrap();

    assert_eq!(probe.content_length, Some(10));
    assert!(!probe.accept_ranges);
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/missing");
            then.status(404);
        })
        .await;

    let url = Url::parse(&server.url("/missing")).unwrap();
    let probe = test_transport().head(&url).await.unwrap();

    assert_eq!(probe.status, 404);
    assert!(!probe.is_success());
}

#[tokio::test]
async fn test_get_streams_full_body() {
    let content = create_test_content(TEST_SIZE);
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/file.bin");
            then.status(200).body(&content);
        })
        .await;

    let url = Url::parse(&server.url("/file.bin")).unwrap();
    let response = test_transport().get(&url, None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_length, Some(TEST_SIZE as u64));
    assert_eq!(response.content_range, None);
    assert_eq!(collect_body(response).await, content);
}

#[tokio::test]
async fn test_get_sends_range_header() {
    let content = create_test_content(TEST_SIZE);
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/file.bin")
                .header("range", "bytes=400-");
            then.status(206)
                .header("content-range", "bytes 400-999/1000")
                .body(&content[400..]);
        })
        .await;

    let url = Url::parse(&server.url("/file.bin")).unwrap();
    let response = test_transport().get(&url, Some(400)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status, 206);
    assert_eq!(response.content_length, Some(600));
    assert_eq!(
        response.content_range,
        Some(ContentRange {
            start: 400,
            end: 999,
            total: Some(1000),
        })
    );
    assert_eq!(collect_body(response).await, &content[400..]);
}

#[tokio::test]
async fn test_connection_refused_is_an_error() {
    // Nothing listens on port 1.
    let url = Url::parse("http://127.0.0.1:1/file.bin").unwrap();
    let transport = test_transport();

    assert!(transport.head(&url).await.is_err());
    assert!(transport.get(&url, None).await.is_err());
}
