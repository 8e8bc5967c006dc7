//! Upstream payload shapes and the normalized records built from them.
//!
//! [`RawMovie`] is deliberately permissive: every field except `id` is
//! optional and numeric/boolean fields accept strings, numbers or `null`.
//! [`MovieRecord`] is the strict, normalized form handed to callers.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Upstream pagination ceiling; TMDB refuses pages above this.
pub const MAX_PAGES: u32 = 1000;

/// Page size used by every upstream listing endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Filter map carried through searches, keyed by upstream parameter name.
pub type Filters = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// A single entry of the genre catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreListResponse {
    #[serde(default)]
    pub genres: Vec<GenreRecord>,
}

// ---------------------------------------------------------------------------
// Raw upstream payloads
// ---------------------------------------------------------------------------

/// A movie as returned by any upstream endpoint, before normalization.
///
/// Fields the access layer does not interpret (runtime, credits, ...) are
/// kept verbatim in `extra` so they survive enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMovie {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::float",
        skip_serializing_if = "Option::is_none"
    )]
    pub vote_average: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub vote_count: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::boolean",
        skip_serializing_if = "Option::is_none"
    )]
    pub adult: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::boolean",
        skip_serializing_if = "Option::is_none"
    )]
    pub video: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::float",
        skip_serializing_if = "Option::is_none"
    )]
    pub popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<GenreRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of an upstream listing or search.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPage<T> {
    #[serde(default, deserialize_with = "lenient::int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_pages: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub total_results: Option<i64>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

// ---------------------------------------------------------------------------
// Normalized movie
// ---------------------------------------------------------------------------

/// Normalized movie handed to callers. Built once per payload, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub adult: bool,
    pub video: bool,
    pub original_language: String,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
    pub genres: Vec<GenreRecord>,
    /// One name per id; ids missing from the catalogue read `"Unknown"`.
    pub genre_names: Vec<String>,
    pub homepage: Option<String>,
    pub runtime: Option<i64>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub production_companies: Vec<Value>,
    pub production_countries: Vec<Value>,
    pub spoken_languages: Vec<Value>,
    pub credits: Option<Value>,
    pub videos: Option<Value>,
    pub images: Option<Value>,
    pub recommendations: Option<Value>,
    pub similar: Option<Value>,
}

impl MovieRecord {
    /// Build the strict record from an (already enriched) raw payload.
    pub fn from_raw(raw: RawMovie) -> Self {
        let RawMovie {
            id,
            title,
            original_title,
            overview,
            poster_path,
            backdrop_path,
            poster_url,
            backdrop_url,
            release_date,
            vote_average,
            vote_count,
            adult,
            video,
            popularity,
            original_language,
            genre_ids,
            genres,
            genre_names,
            mut extra,
        } = raw;

        MovieRecord {
            id,
            title: title.unwrap_or_default(),
            original_title,
            overview: overview.unwrap_or_default(),
            poster_path,
            backdrop_path,
            poster_url,
            backdrop_url,
            release_date: parse_release_date(id, release_date.as_deref()),
            vote_average: vote_average.unwrap_or(0.0),
            vote_count: vote_count.unwrap_or(0),
            adult: adult.unwrap_or(false),
            video: video.unwrap_or(false),
            original_language: original_language.unwrap_or_else(|| "en".to_string()),
            popularity: popularity.unwrap_or(0.0),
            genre_ids: genre_ids.unwrap_or_default(),
            genre_names: genre_names.unwrap_or_else(|| {
                genres
                    .iter()
                    .flatten()
                    .map(|g| g.name.clone())
                    .collect()
            }),
            genres: genres.unwrap_or_default(),
            homepage: take_string(&mut extra, "homepage"),
            runtime: take_int(&mut extra, "runtime"),
            status: take_string(&mut extra, "status"),
            tagline: take_string(&mut extra, "tagline"),
            budget: take_int(&mut extra, "budget"),
            revenue: take_int(&mut extra, "revenue"),
            production_companies: take_array(&mut extra, "production_companies"),
            production_countries: take_array(&mut extra, "production_countries"),
            spoken_languages: take_array(&mut extra, "spoken_languages"),
            credits: take_value(&mut extra, "credits"),
            videos: take_value(&mut extra, "videos"),
            images: take_value(&mut extra, "images"),
            recommendations: take_value(&mut extra, "recommendations"),
            similar: take_value(&mut extra, "similar"),
        }
    }

    pub fn has_genre(&self, genre_id: i64) -> bool {
        self.genre_ids.contains(&genre_id)
    }

    /// Whether the release date lies strictly before `today`.
    pub fn is_released(&self, today: NaiveDate) -> bool {
        self.release_date.is_some_and(|d| d < today)
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    pub fn has_high_rating(&self, threshold: f64) -> bool {
        self.vote_average >= threshold
    }
}

fn parse_release_date(id: i64, date: Option<&str>) -> Option<NaiveDate> {
    let date = date.filter(|d| !d.trim().is_empty())?;
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(movie_id = id, release_date = date, error = %e, "Invalid release date format");
            None
        }
    }
}

fn take_value(extra: &mut Map<String, Value>, key: &str) -> Option<Value> {
    extra.remove(key).filter(|v| !v.is_null())
}

fn take_string(extra: &mut Map<String, Value>, key: &str) -> Option<String> {
    match take_value(extra, key)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn take_int(extra: &mut Map<String, Value>, key: &str) -> Option<i64> {
    lenient::value_to_int(&take_value(extra, key)?)
}

fn take_array(extra: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match take_value(extra, key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A search hit: a normalized movie, or a passthrough object for other media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchItem {
    Movie(Box<MovieRecord>),
    Other(Value),
}

impl SearchItem {
    pub fn as_movie(&self) -> Option<&MovieRecord> {
        match self {
            SearchItem::Movie(m) => Some(m),
            SearchItem::Other(_) => None,
        }
    }
}

impl From<MovieRecord> for SearchItem {
    fn from(movie: MovieRecord) -> Self {
        SearchItem::Movie(Box::new(movie))
    }
}

/// A page of results together with the query and filters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub page: u32,
    /// Always `<= MAX_PAGES`.
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<SearchItem>,
    pub query: String,
    pub filters: Filters,
}

/// Pagination summary for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub per_page: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationInfo {
    pub fn new(page: u32, total_pages: u32, total_results: u64) -> Self {
        let total_pages = total_pages.min(MAX_PAGES);
        Self {
            current_page: page,
            total_pages,
            total_results,
            per_page: DEFAULT_PAGE_SIZE,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

impl SearchResult {
    /// Build a result, capping `total_pages` at the upstream ceiling.
    pub fn new(
        page: u32,
        total_pages: u64,
        total_results: u64,
        results: Vec<SearchItem>,
        query: &str,
        filters: Filters,
    ) -> Self {
        Self {
            page: page.max(1),
            total_pages: total_pages.min(MAX_PAGES as u64) as u32,
            total_results,
            results,
            query: query.to_string(),
            filters,
        }
    }

    pub(crate) fn from_page<T>(
        page: &RawPage<T>,
        results: Vec<SearchItem>,
        query: &str,
        filters: Filters,
    ) -> Self {
        Self::new(
            clamp_to_u32(page.page.unwrap_or(1)),
            page.total_pages.unwrap_or(1).max(0) as u64,
            page.total_results.unwrap_or(0).max(0) as u64,
            results,
            query,
            filters,
        )
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// The movie hits, skipping passthrough items.
    pub fn movies(&self) -> Vec<&MovieRecord> {
        self.results.iter().filter_map(SearchItem::as_movie).collect()
    }

    pub fn pagination(&self) -> PaginationInfo {
        PaginationInfo::new(self.page, self.total_pages, self.total_results)
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    value.clamp(1, u32::MAX as i64) as u32
}

// ---------------------------------------------------------------------------
// Lenient scalar decoding
// ---------------------------------------------------------------------------

/// Deserializers that accept numbers, numeric strings, booleans or `null`.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn value_to_float(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn value_to_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            }
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn value_to_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => {
                let s = s.trim();
                Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
            }
            _ => None,
        }
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(value_to_float))
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(value_to_int))
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(value_to_bool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_movie_tolerates_strings_and_nulls() {
        let raw: RawMovie = serde_json::from_value(json!({
            "id": 550,
            "title": "Fight Club",
            "vote_average": "8.4",
            "vote_count": "27000",
            "adult": 0,
            "video": null,
            "popularity": null,
            "runtime": 139
        }))
        .unwrap();

        assert_eq!(raw.vote_average, Some(8.4));
        assert_eq!(raw.vote_count, Some(27_000));
        assert_eq!(raw.adult, Some(false));
        assert_eq!(raw.video, None);
        assert_eq!(raw.popularity, None);
        assert_eq!(raw.extra.get("runtime"), Some(&json!(139)));
    }

    #[test]
    fn movie_record_defaults() {
        let record = MovieRecord::from_raw(RawMovie {
            id: 1,
            ..Default::default()
        });

        assert_eq!(record.title, "");
        assert_eq!(record.overview, "");
        assert_eq!(record.vote_average, 0.0);
        assert_eq!(record.vote_count, 0);
        assert!(!record.adult);
        assert_eq!(record.original_language, "en");
        assert!(record.release_date.is_none());
        assert!(record.genres.is_empty());
    }

    #[test]
    fn movie_record_extended_fields() {
        let raw: RawMovie = serde_json::from_value(json!({
            "id": 550,
            "title": "Fight Club",
            "release_date": "1999-10-15",
            "runtime": 139,
            "budget": 63000000,
            "tagline": "Mischief. Mayhem. Soap.",
            "production_companies": [{"id": 508, "name": "Regency Enterprises"}],
            "credits": {"cast": []},
            "similar": null
        }))
        .unwrap();

        let record = MovieRecord::from_raw(raw);
        assert_eq!(record.runtime, Some(139));
        assert_eq!(record.budget, Some(63_000_000));
        assert_eq!(record.tagline.as_deref(), Some("Mischief. Mayhem. Soap."));
        assert_eq!(record.production_companies.len(), 1);
        assert_eq!(record.credits, Some(json!({"cast": []})));
        assert!(record.similar.is_none());
        assert_eq!(record.release_year(), Some(1999));
        assert!(record.is_released(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn invalid_release_date_becomes_none() {
        let record = MovieRecord::from_raw(RawMovie {
            id: 1,
            release_date: Some("15/10/1999".into()),
            ..Default::default()
        });
        assert!(record.release_date.is_none());
    }

    #[test]
    fn total_pages_capped_at_upstream_ceiling() {
        let result = SearchResult::new(1, 5000, 100_000, Vec::new(), "q", Filters::new());
        assert_eq!(result.total_pages, 1000);
        assert!(result.has_next_page());
        assert!(!result.has_previous_page());
    }

    #[test]
    fn pagination_info_flags() {
        let info = PaginationInfo::new(3, 3, 55);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
        assert_eq!(info.per_page, 20);
    }

    #[test]
    fn movie_record_serializes_date_as_iso() {
        let record = MovieRecord::from_raw(RawMovie {
            id: 1,
            release_date: Some("2010-07-16".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["release_date"], "2010-07-16");
    }
}
