//! Integration tests for `ContentFetcher::fetch`.
//!
//! Each test stands up a local `wiremock` server so no real network traffic
//! is made.

use std::time::Duration;

use reqwest::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outreach_scraper::{retry_with_backoff, ContentFetcher, ContentSource, FetchError, FetcherConfig};

fn fetcher(max_bytes: usize, max_redirects: usize) -> ContentFetcher {
    ContentFetcher::new(&FetcherConfig {
        user_agent: "outreach-test/0.1".to_owned(),
        max_bytes,
        max_redirects,
    })
    .expect("failed to build test ContentFetcher")
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).expect("valid mock url")
}

#[tokio::test]
async fn fetch_returns_body_and_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>Acme</title></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let raw = fetcher(1_000_000, 5)
        .fetch(&url(&server, "/"), Duration::from_secs(5))
        .await
        .expect("fetch should succeed");

    assert_eq!(raw.body, "<html><title>Acme</title></html>");
    assert!(!raw.truncated);
    assert_eq!(raw.url, format!("{}/", server.uri()));
}

#[tokio::test]
async fn fetch_truncates_to_byte_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(10_000)))
        .mount(&server)
        .await;

    let raw = fetcher(1_024, 5)
        .fetch(&url(&server, "/big"), Duration::from_secs(5))
        .await
        .expect("oversized page should be truncated, not rejected");

    assert_eq!(raw.body.len(), 1_024);
    assert!(raw.truncated);
}

#[tokio::test]
async fn fetch_follows_redirects_within_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let raw = fetcher(1_000_000, 5)
        .fetch(&url(&server, "/old"), Duration::from_secs(5))
        .await
        .expect("single redirect should be followed");

    assert_eq!(raw.body, "moved here");
    assert!(raw.url.ends_with("/new"));
}

#[tokio::test]
async fn fetch_fails_on_redirect_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let err = fetcher(1_000_000, 2)
        .fetch(&url(&server, "/loop"), Duration::from_secs(5))
        .await
        .expect_err("redirect loop must fail");

    assert!(
        matches!(err, FetchError::TooManyRedirects { limit: 2, .. }),
        "expected TooManyRedirects, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_maps_not_found_to_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(1_000_000, 5)
        .fetch(&url(&server, "/missing"), Duration::from_secs(5))
        .await
        .expect_err("404 must fail");

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn fetch_times_out_on_slow_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = fetcher(1_000_000, 5)
        .fetch(&url(&server, "/slow"), Duration::from_millis(100))
        .await
        .expect_err("slow response must time out");

    assert!(
        matches!(err, FetchError::Timeout { timeout_ms: 100, .. }),
        "expected Timeout, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_with_retries_recovers_from_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let fetcher = fetcher(1_000_000, 5);
    let target = url(&server, "/flaky");
    let raw = retry_with_backoff(1, 0, || fetcher.fetch(&target, Duration::from_secs(5)))
        .await
        .expect("retry should recover");
    assert_eq!(raw.body, "recovered");
}
