//! Listing, detail and discovery operations over the movie endpoints.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::metadata::client::{query_params, ApiClient, CachePolicy, QueryParams};
use crate::metadata::collection::MovieCollectionProcessor;
use crate::metadata::criteria::to_query_params;
use crate::metadata::error::Result;
use crate::metadata::types::{Filters, MovieRecord, RawMovie, RawPage, SearchItem, SearchResult, MAX_PAGES};

/// Sections appended to every detail request.
pub const DEFAULT_APPEND: [&str; 5] = ["credits", "videos", "images", "recommendations", "similar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            other => Err(format!("unknown time window: {other}")),
        }
    }
}

/// Curated movie lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingKind {
    #[default]
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
    Trending(TimeWindow),
}

impl ListingKind {
    pub fn endpoint(&self) -> String {
        match self {
            ListingKind::Popular => "/movie/popular".to_string(),
            ListingKind::NowPlaying => "/movie/now_playing".to_string(),
            ListingKind::TopRated => "/movie/top_rated".to_string(),
            ListingKind::Upcoming => "/movie/upcoming".to_string(),
            ListingKind::Trending(window) => format!("/trending/movie/{}", window.as_str()),
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Popular => f.write_str("popular"),
            ListingKind::NowPlaying => f.write_str("now_playing"),
            ListingKind::TopRated => f.write_str("top_rated"),
            ListingKind::Upcoming => f.write_str("upcoming"),
            ListingKind::Trending(window) => write!(f, "trending_{}", window.as_str()),
        }
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "popular" => Ok(ListingKind::Popular),
            "now_playing" => Ok(ListingKind::NowPlaying),
            "top_rated" => Ok(ListingKind::TopRated),
            "upcoming" => Ok(ListingKind::Upcoming),
            "trending" | "trending_day" => Ok(ListingKind::Trending(TimeWindow::Day)),
            "trending_week" => Ok(ListingKind::Trending(TimeWindow::Week)),
            other => Err(format!("unknown listing: {other}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<RawMovie>,
}

/// Union of the default append sections and `extra`, first occurrence wins.
pub fn append_sections(extra: &[&str]) -> Vec<String> {
    let mut sections: Vec<String> = Vec::with_capacity(DEFAULT_APPEND.len() + extra.len());
    for section in DEFAULT_APPEND.iter().chain(extra) {
        let section = section.trim();
        if !section.is_empty() && !sections.iter().any(|s| s == section) {
            sections.push(section.to_string());
        }
    }
    sections
}

fn page_param(page: u32) -> String {
    page.clamp(1, MAX_PAGES).to_string()
}

#[derive(Debug, Clone)]
pub struct MovieService {
    client: Arc<ApiClient>,
    processor: Arc<MovieCollectionProcessor>,
}

impl MovieService {
    pub fn new(client: Arc<ApiClient>, processor: Arc<MovieCollectionProcessor>) -> Self {
        Self { client, processor }
    }

    /// Fetch one page of movies and run the enrichment pass over it.
    async fn movie_page(
        &self,
        endpoint: &str,
        params: &QueryParams,
        filters: Filters,
    ) -> Result<SearchResult> {
        let mut upstream: RawPage<RawMovie> =
            self.client.get(endpoint, params, CachePolicy::Dynamic).await?;
        let movies = self
            .processor
            .process(std::mem::take(&mut upstream.results))
            .await?;

        Ok(SearchResult::from_page(
            &upstream,
            movies.into_iter().map(SearchItem::from).collect(),
            "",
            filters,
        ))
    }

    pub async fn listing(&self, kind: ListingKind, page: u32) -> Result<SearchResult> {
        debug!(listing = %kind, page, "Fetching movie listing");
        let params = query_params([("page", page_param(page))]);
        self.movie_page(&kind.endpoint(), &params, Filters::new())
            .await
    }

    pub async fn popular(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Popular, page).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::NowPlaying, page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::TopRated, page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Upcoming, page).await
    }

    pub async fn trending(&self, window: TimeWindow, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Trending(window), page).await
    }

    /// Full detail record in a single call, with the default sections
    /// appended plus `append_to`.
    pub async fn details(&self, movie_id: i64, append_to: &[&str]) -> Result<MovieRecord> {
        let params = query_params([("append_to_response", append_sections(append_to).join(","))]);
        let raw: RawMovie = self
            .client
            .get(&format!("/movie/{movie_id}"), &params, CachePolicy::Dynamic)
            .await?;
        self.processor.enricher().enrich(raw).await
    }

    /// Details for each id in order. A failing id is logged and skipped.
    pub async fn by_ids(&self, movie_ids: &[i64], append_to: &[&str]) -> Vec<MovieRecord> {
        let mut movies = Vec::with_capacity(movie_ids.len());
        for &movie_id in movie_ids {
            match self.details(movie_id, append_to).await {
                Ok(movie) => movies.push(movie),
                Err(e) => warn!(movie_id, error = %e, "Failed to fetch movie, skipping"),
            }
        }
        movies
    }

    pub async fn discover(&self, filters: &Filters, page: u32) -> Result<SearchResult> {
        let mut params = to_query_params(filters);
        params.insert("page".into(), page_param(page));
        self.movie_page("/discover/movie", &params, filters.clone())
            .await
    }

    pub async fn by_genre(&self, genre_id: i64, page: u32, extra: &Filters) -> Result<SearchResult> {
        let mut filters = Filters::new();
        filters.insert("with_genres".into(), json!(genre_id));
        filters.insert("sort_by".into(), json!("popularity.desc"));
        filters.extend(extra.clone());
        self.discover(&filters, page).await
    }

    pub async fn by_year(&self, year: i32, page: u32, sort_by: &str) -> Result<SearchResult> {
        let mut filters = Filters::new();
        filters.insert("year".into(), json!(year));
        filters.insert("sort_by".into(), json!(sort_by));
        self.discover(&filters, page).await
    }

    /// Movies released from `decade`-01-01 through (`decade` + 9)-12-31.
    pub async fn by_decade(&self, decade: i32, page: u32) -> Result<SearchResult> {
        let mut filters = Filters::new();
        filters.insert("release_date.gte".into(), json!(format!("{decade}-01-01")));
        filters.insert("release_date.lte".into(), json!(format!("{}-12-31", decade + 9)));
        filters.insert("sort_by".into(), json!("popularity.desc"));
        self.discover(&filters, page).await
    }

    pub async fn by_min_rating(&self, min_rating: f64, page: u32, min_votes: i64) -> Result<SearchResult> {
        let mut filters = Filters::new();
        filters.insert("vote_average.gte".into(), json!(min_rating));
        filters.insert("vote_count.gte".into(), json!(min_votes));
        filters.insert("sort_by".into(), json!("vote_average.desc"));
        self.discover(&filters, page).await
    }

    pub async fn similar(&self, movie_id: i64, page: u32) -> Result<SearchResult> {
        let params = query_params([("page", page_param(page))]);
        self.movie_page(&format!("/movie/{movie_id}/similar"), &params, Filters::new())
            .await
    }

    pub async fn recommendations(&self, movie_id: i64, page: u32) -> Result<SearchResult> {
        let params = query_params([("page", page_param(page))]);
        self.movie_page(
            &format!("/movie/{movie_id}/recommendations"),
            &params,
            Filters::new(),
        )
        .await
    }

    async fn raw(&self, endpoint: String, params: QueryParams) -> Result<Value> {
        self.client
            .request(&endpoint, &params, CachePolicy::Dynamic)
            .await
    }

    pub async fn credits(&self, movie_id: i64) -> Result<Value> {
        self.raw(format!("/movie/{movie_id}/credits"), QueryParams::new())
            .await
    }

    pub async fn videos(&self, movie_id: i64) -> Result<Value> {
        self.raw(format!("/movie/{movie_id}/videos"), QueryParams::new())
            .await
    }

    pub async fn images(&self, movie_id: i64) -> Result<Value> {
        self.raw(format!("/movie/{movie_id}/images"), QueryParams::new())
            .await
    }

    pub async fn reviews(&self, movie_id: i64, page: u32) -> Result<Value> {
        self.raw(
            format!("/movie/{movie_id}/reviews"),
            query_params([("page", page_param(page))]),
        )
        .await
    }

    pub async fn keywords(&self, movie_id: i64) -> Result<Value> {
        self.raw(format!("/movie/{movie_id}/keywords"), QueryParams::new())
            .await
    }

    pub async fn release_dates(&self, movie_id: i64) -> Result<Value> {
        self.raw(format!("/movie/{movie_id}/release_dates"), QueryParams::new())
            .await
    }

    /// Look a movie up by an external id such as an IMDb `tt` id.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
        source: &str,
    ) -> Result<Option<MovieRecord>> {
        let params = query_params([("external_source", source)]);
        let found: FindResponse = self
            .client
            .get(&format!("/find/{external_id}"), &params, CachePolicy::Dynamic)
            .await?;

        match found.movie_results.into_iter().next() {
            Some(raw) => Ok(Some(self.processor.enricher().enrich(raw).await?)),
            None => Ok(None),
        }
    }
}
