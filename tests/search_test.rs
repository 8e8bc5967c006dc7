//! Integration tests for movie search strategy dispatch and the facade.

mod common;

use common::{movie_json, page_json, TestHarness};
use reelshelf::metadata::{Filters, SearchCriteria, SearchItem, TmdbError};
use assert_matches::assert_matches;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn ids(result: &reelshelf::metadata::SearchResult) -> Vec<i64> {
    result.movies().iter().map(|m| m.id).collect()
}

// ---------------------------------------------------------------------------
// Genre-filtered strategy
// ---------------------------------------------------------------------------

/// Two upstream pages of 20 where ids 1, 5, 9, 13, 21 and 30 carry genre 28.
fn scan_page(page: u32) -> Value {
    let matching = [1, 5, 9, 13, 21, 30];
    let start = (page as i64 - 1) * 20 + 1;
    let results = (start..start + 20)
        .map(|id| {
            let genres: &[i64] = if matching.contains(&id) { &[28, 12] } else { &[35] };
            movie_json(id, &format!("Hero {id}"), genres)
        })
        .collect();
    page_json(page, 2, 40, results)
}

#[tokio::test]
async fn genre_filtered_search_scans_every_upstream_page() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    for page in 1..=2 {
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "hero"))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(scan_page(page)))
            .expect(1)
            .mount(&h.server)
            .await;
    }

    let filters = SearchCriteria::new().with_genre(28).build();
    let result = h.tmdb().search_movies("hero", 1, &filters).await.unwrap();

    assert_eq!(result.total_results, 6);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.page, 1);
    assert_eq!(ids(&result), vec![1, 5, 9, 13, 21, 30]);
    assert_eq!(result.query, "hero");

    let first = result.movies()[0];
    assert_eq!(first.genre_names, vec!["Action", "Adventure"]);
}

#[tokio::test]
async fn genre_filtered_search_sorts_before_paginating() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_page(1)))
        .mount(&h.server)
        .await;

    let mut config = h.config.clone();
    config.search.max_pages_per_query = 1;
    config.search.results_per_page = 2;
    let tmdb = reelshelf::metadata::Tmdb::from_config(&config).unwrap();

    let filters = SearchCriteria::new()
        .with_genre(28)
        .with_sorting("popularity.desc")
        .build();

    // Matches on page 1 are 1, 5, 9, 13; popularity equals the id.
    let result = tmdb.search_movies("hero", 2, &filters).await.unwrap();
    assert_eq!(ids(&result), vec![5, 1]);
    assert_eq!(result.total_results, 4);
    assert_eq!(result.total_pages, 2);
    assert_eq!(result.page, 2);
}

/// Mount `mounted` upstream pages of 20 claiming 50 pages in total, where the
/// first `matching` movies of each page carry genre 28. Pages up to
/// `expected_calls` must be requested once, later pages never.
async fn mount_long_scan(h: &TestHarness, mounted: u32, matching: i64, expected_calls: u32) {
    for page in 1..=mounted {
        let start = (page as i64 - 1) * 20 + 1;
        let results = (start..start + 20)
            .map(|id| {
                let genres: &[i64] = if id - start < matching { &[28] } else { &[35] };
                movie_json(id, &format!("Hero {id}"), genres)
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(page, 50, 1000, results)))
            .expect(u64::from(page <= expected_calls))
            .mount(&h.server)
            .await;
    }
}

#[tokio::test]
async fn genre_scan_stops_at_page_limit() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    mount_long_scan(&h, 8, 2, 5).await;

    let filters = SearchCriteria::new().with_genre(28).build();
    let result = h.tmdb().search_movies("hero", 1, &filters).await.unwrap();

    assert_eq!(result.total_results, 10);
    assert_eq!(result.total_pages, 1);
    assert_eq!(ids(&result), vec![1, 2, 21, 22, 41, 42, 61, 62, 81, 82]);
}

#[tokio::test]
async fn genre_scan_stops_once_enough_matches_collected() {
    let mut h = TestHarness::new().await;
    h.mount_genres().await;
    h.config.search.max_pages_per_query = 10;
    mount_long_scan(&h, 10, 20, 5).await;

    let filters = SearchCriteria::new().with_genre(28).build();
    let result = h.tmdb().search_movies("hero", 1, &filters).await.unwrap();

    assert_eq!(result.total_results, 100);
    assert_eq!(result.total_pages, 5);
    assert_eq!(result.page, 1);
    assert_eq!(result.movies().len(), 20);
}

#[tokio::test]
async fn genre_scan_keeps_the_whole_page_that_crosses_the_cap() {
    let mut h = TestHarness::new().await;
    h.mount_genres().await;
    h.config.search.max_scan_results = 30;
    mount_long_scan(&h, 5, 20, 2).await;

    let filters = SearchCriteria::new().with_genre(28).build();
    let result = h.tmdb().search_movies("hero", 2, &filters).await.unwrap();

    assert_eq!(result.total_results, 40);
    assert_eq!(result.total_pages, 2);
    assert_eq!(ids(&result), (21..=40).collect::<Vec<i64>>());
}

// ---------------------------------------------------------------------------
// Simple and advanced strategies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn simple_search_passes_upstream_pagination_through() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "alien"))
        .and(query_param("include_adult", "false"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            3,
            7,
            130,
            vec![
                movie_json(2, "b alien", &[878]),
                movie_json(1, "A Alien", &[878]),
            ],
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    let filters = SearchCriteria::new().with_sorting("title.asc").build();
    let result = h.tmdb().search_movies("alien", 3, &filters).await.unwrap();

    assert_eq!(result.page, 3);
    assert_eq!(result.total_pages, 7);
    assert_eq!(result.total_results, 130);
    assert_eq!(ids(&result), vec![1, 2]);

    // Unknown ids resolve to the placeholder name.
    assert_eq!(result.movies()[0].genre_names, vec!["Unknown"]);
}

#[tokio::test]
async fn genre_without_text_uses_discovery() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "28"))
        .and(query_param("sort_by", "popularity.desc"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            1,
            3,
            60,
            vec![movie_json(7, "Action One", &[28])],
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    let filters = SearchCriteria::new().with_genre(28).build();
    let result = h.tmdb().search_movies("  ", 1, &filters).await;

    // A blank query is rejected by the facade before any request.
    assert_matches!(result, Err(TmdbError::Validation(_)));

    let services = h.services();
    let result = services.search.search_movies("", 1, &filters).await.unwrap();
    assert_eq!(ids(&result), vec![7]);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.total_results, 60);
}

#[tokio::test]
async fn advanced_search_filters_page_by_text() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("year", "1999"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            2,
            50,
            1000,
            vec![
                movie_json(603, "The Matrix", &[28]),
                movie_json(604, "Fight Club", &[18]),
                movie_json(605, "Matrix Reloaded Preview", &[28]),
            ],
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    let criteria = SearchCriteria::new()
        .with_query("matrix")
        .with_year(1999)
        .with_page(2)
        .build();
    let result = h.tmdb().advanced_search(&criteria).await.unwrap();

    assert_eq!(ids(&result), vec![603, 605]);
    assert_eq!(result.total_results, 2);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.page, 2);
    assert_eq!(result.query, "matrix");
}

// ---------------------------------------------------------------------------
// Listings, multi search, facade validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_total_pages_is_capped() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 5000,
            "total_results": 100000,
            "results": [{
                "id": 1,
                "title": "Popular",
                "genres": [{"id": 28, "name": "Action"}]
            }]
        })))
        .mount(&h.server)
        .await;

    let result = h.tmdb().popular(1).await.unwrap();
    assert_eq!(result.total_pages, 1000);
    assert_eq!(result.total_results, 100000);
    assert!(result.has_next_page());

    // Genre objects were present, so the catalogue was never requested.
    let requests = h.server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/genre/movie/list"));
}

#[tokio::test]
async fn multi_search_enriches_movies_only() {
    let h = TestHarness::new().await;
    h.mount_genres().await;
    let mut movie = movie_json(550, "Fight Club", &[18]);
    movie["media_type"] = json!("movie");
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("query", "fight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            1,
            1,
            2,
            vec![
                movie,
                json!({"id": 1399, "name": "Fight Show", "media_type": "tv"}),
            ],
        )))
        .mount(&h.server)
        .await;

    let result = h
        .tmdb()
        .search_multi("fight", 1, &Filters::new())
        .await
        .unwrap();

    assert_eq!(result.results.len(), 2);
    let movie = result.results[0].as_movie().unwrap();
    assert_eq!(movie.genre_names, vec!["Drama"]);
    assert!(movie.poster_url.is_some());
    assert_matches!(&result.results[1], SearchItem::Other(v) if v["media_type"] == "tv");
}

#[tokio::test]
async fn blank_queries_never_reach_upstream() {
    let h = TestHarness::new().await;
    let tmdb = h.tmdb();

    assert_matches!(
        tmdb.search_movies("", 1, &Filters::new()).await,
        Err(TmdbError::Validation(_))
    );
    assert_matches!(
        tmdb.search_multi(" ", 1, &Filters::new()).await,
        Err(TmdbError::Validation(_))
    );
    assert_matches!(
        tmdb.search_people("", 1, &Filters::new()).await,
        Err(TmdbError::Validation(_))
    );

    assert!(h.server.received_requests().await.unwrap().is_empty());
}
