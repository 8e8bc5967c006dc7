//! In-memory post-processing of movie lists: enrich, sort, text-filter,
//! paginate. Used where the upstream query model cannot express a
//! combination on its own.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::metadata::enrichment::MovieDataEnricher;
use crate::metadata::error::Result;
use crate::metadata::types::{MovieRecord, RawMovie};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Popularity,
    VoteAverage,
    ReleaseDate,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A client-side sort such as `popularity.desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (field, order) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid sort key: {s}"))?;

        let field = match field {
            "popularity" => SortField::Popularity,
            "vote_average" => SortField::VoteAverage,
            "release_date" => SortField::ReleaseDate,
            "title" => SortField::Title,
            _ => return Err(format!("unsupported sort field: {field}")),
        };
        let order = match order {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(format!("unsupported sort order: {order}")),
        };

        Ok(SortKey { field, order })
    }
}

impl SortKey {
    fn compare(&self, a: &MovieRecord, b: &MovieRecord) -> Ordering {
        let ordering = match self.field {
            SortField::Popularity => a.popularity.total_cmp(&b.popularity),
            SortField::VoteAverage => a.vote_average.total_cmp(&b.vote_average),
            // Missing dates compare lowest.
            SortField::ReleaseDate => a.release_date.cmp(&b.release_date),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Sort in place. Unknown keys leave the order untouched.
pub fn sort_movies(movies: &mut [MovieRecord], key: &str) {
    if let Ok(key) = key.parse::<SortKey>() {
        movies.sort_by(|a, b| key.compare(a, b));
    }
}

/// Keep movies whose title, original title or overview contains the whole
/// phrase, or any word longer than `min_word_length`.
pub fn filter_by_text(
    movies: Vec<MovieRecord>,
    text: &str,
    min_word_length: usize,
) -> Vec<MovieRecord> {
    let phrase = text.trim().to_lowercase();
    if phrase.is_empty() {
        return movies;
    }

    let words: Vec<&str> = phrase
        .split(' ')
        .filter(|w| w.chars().count() > min_word_length)
        .collect();

    movies
        .into_iter()
        .filter(|movie| {
            let fields = [
                movie.title.to_lowercase(),
                movie
                    .original_title
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase(),
                movie.overview.to_lowercase(),
            ];
            let contains = |needle: &str| fields.iter().any(|f| f.contains(needle));

            contains(&phrase) || words.iter().any(|&w| contains(w))
        })
        .collect()
}

/// One page of an in-memory list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub total_results: usize,
    pub total_pages: usize,
    pub page: usize,
}

pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Paginated<T> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_results = items.len();
    let total_pages = total_results.div_ceil(per_page).max(1);
    let offset = (page - 1).saturating_mul(per_page);

    Paginated {
        results: items.into_iter().skip(offset).take(per_page).collect(),
        total_results,
        total_pages,
        page,
    }
}

/// Enrichment plus the in-memory helpers above, bound to search settings.
#[derive(Debug, Clone)]
pub struct MovieCollectionProcessor {
    enricher: Arc<MovieDataEnricher>,
    min_word_length: usize,
}

impl MovieCollectionProcessor {
    pub fn new(enricher: Arc<MovieDataEnricher>, min_word_length: usize) -> Self {
        Self {
            enricher,
            min_word_length,
        }
    }

    pub fn enricher(&self) -> &MovieDataEnricher {
        &self.enricher
    }

    /// Enrichment pass over one upstream page of results.
    pub async fn process(&self, movies: Vec<RawMovie>) -> Result<Vec<MovieRecord>> {
        self.enricher.enrich_all(movies).await
    }

    pub fn sort(&self, mut movies: Vec<MovieRecord>, key: &str) -> Vec<MovieRecord> {
        sort_movies(&mut movies, key);
        movies
    }

    pub fn filter_by_text(&self, movies: Vec<MovieRecord>, text: &str) -> Vec<MovieRecord> {
        filter_by_text(movies, text, self.min_word_length)
    }

    pub fn paginate(
        &self,
        movies: Vec<MovieRecord>,
        page: usize,
        per_page: usize,
    ) -> Paginated<MovieRecord> {
        paginate(movies, page, per_page)
    }
}
