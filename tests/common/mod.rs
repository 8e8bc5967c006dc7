//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which starts a [`MockServer`] standing in for
//! the TMDB API and builds a [`Config`] pointing at it with rate limiting
//! disabled and short retry delays.

#![allow(dead_code)]

use reelshelf::config::Config;
use reelshelf::metadata::{ApiClient, Services, Tmdb};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

pub struct TestHarness {
    pub server: MockServer,
    pub config: Config,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.tmdb.api_key = TEST_TOKEN.to_string();
        config.tmdb.base_url = server.uri();
        config.tmdb.timeout_secs = 5;
        config.rate_limiting.delay_ms = 0;
        config.rate_limiting.max_retries = 2;
        config.rate_limiting.retry_delay_ms = 10;
        Self { server, config }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config).expect("client should build")
    }

    pub fn services(&self) -> Services {
        Services::from_config(&self.config).expect("services should build")
    }

    pub fn tmdb(&self) -> Tmdb {
        Tmdb::from_config(&self.config).expect("facade should build")
    }

    /// Serve the genre catalogue used by most scenarios.
    pub async fn mount_genres(&self) {
        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(genre_catalogue()))
            .mount(&self.server)
            .await;
    }
}

pub fn genre_catalogue() -> Value {
    json!({
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 12, "name": "Adventure"},
            {"id": 35, "name": "Comedy"},
            {"id": 18, "name": "Drama"}
        ]
    })
}

pub fn movie_json(id: i64, title: &str, genre_ids: &[i64]) -> Value {
    json!({
        "id": id,
        "title": title,
        "original_title": title,
        "overview": format!("Overview of {title}"),
        "poster_path": format!("/poster{id}.jpg"),
        "backdrop_path": null,
        "release_date": "2001-01-01",
        "vote_average": 7.0,
        "vote_count": 100,
        "popularity": id as f64,
        "adult": false,
        "genre_ids": genre_ids
    })
}

pub fn page_json(page: u32, total_pages: u32, total_results: u32, results: Vec<Value>) -> Value {
    json!({
        "page": page,
        "total_pages": total_pages,
        "total_results": total_results,
        "results": results
    })
}

pub fn error_json(message: &str) -> Value {
    json!({"status_code": 0, "status_message": message, "success": false})
}
