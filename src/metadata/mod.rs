//! TMDB access layer.
//!
//! Callers talk to the [`Tmdb`] facade; everything underneath goes through
//! the rate-limited, cached [`ApiClient`].
//!
//! # Module layout
//!
//! - [`client`] -- Base client, response cache and rate limiter.
//! - [`types`] -- Raw payloads, [`MovieRecord`], [`SearchResult`].
//! - [`genres`] -- Genre catalogue and genre reconciliation.
//! - [`images`] -- Image URL builder.
//! - [`enrichment`] -- Raw payload to normalized record.
//! - [`collection`] -- In-memory sort, text filter, pagination.
//! - [`criteria`] -- Search filter builder.
//! - [`strategies`] -- Simple, genre-filtered and advanced search.
//! - [`movies`], [`search`] -- Services over the endpoints.
//! - [`service`] -- The facade and its traits.

pub mod client;
pub mod collection;
pub mod criteria;
pub mod enrichment;
pub mod error;
pub mod genres;
pub mod images;
pub mod movies;
pub mod search;
pub mod service;
pub mod strategies;
pub mod types;

pub use client::{ApiClient, CachePolicy, MemoryCache, QueryParams, RateLimiter, ResponseCache};
pub use criteria::SearchCriteria;
pub use error::{Result, TmdbError};
pub use genres::GenreResolver;
pub use images::{ImageKind, ImageUrlBuilder};
pub use movies::{ListingKind, MovieService, TimeWindow};
pub use search::SearchService;
pub use service::{GenreCatalog, MovieCatalog, MovieSearch, Services, Tmdb};
pub use strategies::{select_strategy, StrategyKind};
pub use types::{Filters, GenreRecord, MovieRecord, PaginationInfo, RawMovie, SearchItem, SearchResult};
