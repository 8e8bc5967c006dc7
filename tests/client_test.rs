//! Integration tests for the base client: caching, errors, retries and
//! rate limiting against a mock TMDB.

mod common;

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use common::{error_json, page_json, TestHarness, TEST_TOKEN};
use reelshelf::metadata::client::query_params;
use reelshelf::metadata::{ApiClient, CachePolicy, QueryParams, TmdbError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// ---------------------------------------------------------------------------
// Request shape and caching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sends_bearer_token_and_query() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(header("accept", "application/json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(2, 10, 200, vec![])))
        .expect(1)
        .mount(&h.server)
        .await;

    let payload = h
        .client()
        .request("/movie/popular", &query_params([("page", 2)]), CachePolicy::Bypass)
        .await
        .unwrap();
    assert_eq!(payload["page"], 2);
}

#[tokio::test]
async fn cache_hit_skips_network() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(1, 1, 0, vec![])))
        .expect(1)
        .mount(&h.server)
        .await;

    let client = h.client();

    let mut first = QueryParams::new();
    first.insert("query".into(), "alien".into());
    first.insert("page".into(), "1".into());

    let mut second = QueryParams::new();
    second.insert("page".into(), "1".into());
    second.insert("query".into(), "alien".into());

    assert_eq!(client.cache_key("/search/movie", &first), client.cache_key("/search/movie", &second));

    let a = client.request("/search/movie", &first, CachePolicy::Dynamic).await.unwrap();
    let b = client.request("/search/movie", &second, CachePolicy::Dynamic).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn bypass_always_hits_network() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 550})))
        .expect(2)
        .mount(&h.server)
        .await;

    let client = h.client();
    for _ in 0..2 {
        client
            .request("/movie/550", &QueryParams::new(), CachePolicy::Bypass)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn invalidate_and_clear_force_refetch() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 550})))
        .expect(3)
        .mount(&h.server)
        .await;

    let client = h.client();
    let params = QueryParams::new();

    client.request("/movie/550", &params, CachePolicy::Dynamic).await.unwrap();
    client.request("/movie/550", &params, CachePolicy::Dynamic).await.unwrap();

    client.invalidate("/movie/550", &params);
    client.request("/movie/550", &params, CachePolicy::Dynamic).await.unwrap();

    client.clear_cache();
    client.request("/movie/550", &params, CachePolicy::Dynamic).await.unwrap();
}

#[tokio::test]
async fn not_found_is_not_cached() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_json(
            "The resource you requested could not be found.",
        )))
        .expect(2)
        .mount(&h.server)
        .await;

    let client = h.client();
    for _ in 0..2 {
        assert_matches!(
            client
                .request("/movie/-1", &QueryParams::new(), CachePolicy::Dynamic)
                .await,
            Err(TmdbError::NotFound { .. })
        );
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

async fn fail_with(status: u16, message: &str) -> TmdbError {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(status).set_body_json(error_json(message)))
        .mount(&h.server)
        .await;

    h.client()
        .request("/movie/popular", &QueryParams::new(), CachePolicy::Dynamic)
        .await
        .unwrap_err()
}

#[tokio::test]
async fn classifies_upstream_statuses() {
    assert_matches!(fail_with(401, "Invalid API key").await, TmdbError::Unauthorized);
    assert_matches!(fail_with(404, "Not found").await, TmdbError::NotFound { .. });
    assert_matches!(fail_with(429, "Slow down").await, TmdbError::RateLimited);
    assert_matches!(
        fail_with(503, "Maintenance").await,
        TmdbError::Server { status: 503, .. }
    );

    let err = fail_with(422, "Invalid page").await;
    assert_matches!(&err, TmdbError::Api { status: 422, message } if message == "Invalid page");
    assert_eq!(err.http_status(), 422);
}

#[tokio::test]
async fn http_errors_are_not_retried() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(500).set_body_json(error_json("boom")))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client()
        .request("/movie/popular", &QueryParams::new(), CachePolicy::Bypass)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&h.server)
        .await;

    assert_matches!(
        h.client()
            .request("/movie/popular", &QueryParams::new(), CachePolicy::Dynamic)
            .await,
        Err(TmdbError::Decode { .. })
    );
}

#[tokio::test]
async fn connection_failure_after_retries() {
    // Bind then drop a listener to get a port nothing is listening on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let h = TestHarness::new().await;
    let mut config = h.config.clone();
    config.tmdb.base_url = format!("http://127.0.0.1:{port}");

    let client = ApiClient::new(&config).unwrap();
    let err = client
        .request("/movie/popular", &QueryParams::new(), CachePolicy::Dynamic)
        .await
        .unwrap_err();

    assert_matches!(err, TmdbError::Connectivity { .. });
    assert_eq!(err.http_status(), 500);
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn consecutive_calls_are_spaced() {
    let mut h = TestHarness::new().await;
    h.config.rate_limiting.delay_ms = 60;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(1, 1, 0, vec![])))
        .expect(4)
        .mount(&h.server)
        .await;

    let client = h.client();
    let start = Instant::now();
    for _ in 0..4 {
        client
            .request("/movie/popular", &QueryParams::new(), CachePolicy::Bypass)
            .await
            .unwrap();
    }

    assert!(start.elapsed() >= Duration::from_millis(60 * 3));
}

#[tokio::test]
async fn cache_hits_do_not_consume_rate_limit() {
    let mut h = TestHarness::new().await;
    h.config.rate_limiting.delay_ms = 500;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(1, 1, 0, vec![])))
        .expect(1)
        .mount(&h.server)
        .await;

    let client = h.client();
    client
        .request("/movie/popular", &QueryParams::new(), CachePolicy::Dynamic)
        .await
        .unwrap();

    let start = Instant::now();
    for _ in 0..5 {
        client
            .request("/movie/popular", &QueryParams::new(), CachePolicy::Dynamic)
            .await
            .unwrap();
    }
    assert!(start.elapsed() < Duration::from_millis(500));
}
