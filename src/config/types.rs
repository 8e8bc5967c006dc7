use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rate_limiting: RateLimitConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// Bearer token for the v3/v4 API (read access token)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// TTL for listings and search results (default: 300)
    #[serde(default = "default_dynamic_ttl")]
    pub dynamic_ttl_secs: u64,

    /// TTL for rarely-changing catalogue data such as genres (default: 86400)
    #[serde(default = "default_static_ttl")]
    pub static_ttl_secs: u64,

    /// Key namespace; `clear` only evicts keys carrying this prefix
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
}

fn default_dynamic_ttl() -> u64 {
    300
}

fn default_static_ttl() -> u64 {
    86_400
}

fn default_cache_prefix() -> String {
    "tmdb_".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dynamic_ttl_secs: default_dynamic_ttl(),
            static_ttl_secs: default_static_ttl(),
            prefix: default_cache_prefix(),
        }
    }
}

impl CacheConfig {
    pub fn dynamic_ttl(&self) -> Duration {
        Duration::from_secs(self.dynamic_ttl_secs)
    }

    pub fn static_ttl(&self) -> Duration {
        Duration::from_secs(self.static_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between outbound calls (default: 250)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Retries after the first attempt, on connection failures only (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Upstream pages scanned by the genre-filtered strategy (default: 5)
    #[serde(default = "default_max_pages")]
    pub max_pages_per_query: u32,

    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,

    /// Matches after which the genre scan stops early (default: 100)
    #[serde(default = "default_max_scan_results")]
    pub max_scan_results: usize,

    /// Query words must be longer than this to match on their own (default: 2)
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    /// Largest id batch accepted by the facade (default: 50)
    #[serde(default = "default_max_batch_ids")]
    pub max_batch_ids: usize,
}

fn default_max_pages() -> u32 {
    5
}

fn default_results_per_page() -> usize {
    20
}

fn default_max_scan_results() -> usize {
    100
}

fn default_min_word_length() -> usize {
    2
}

fn default_max_batch_ids() -> usize {
    50
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_pages_per_query: default_max_pages(),
            results_per_page: default_results_per_page(),
            max_scan_results: default_max_scan_results(),
            min_word_length: default_min_word_length(),
            max_batch_ids: default_max_batch_ids(),
        }
    }
}

/// Size catalogue and default size for one image kind.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImageSizes {
    pub sizes: Vec<String>,
    pub default: String,
}

impl ImageSizes {
    fn new(sizes: &[&str], default: &str) -> Self {
        Self {
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            default: default.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default = "default_poster_sizes")]
    pub poster: ImageSizes,

    #[serde(default = "default_backdrop_sizes")]
    pub backdrop: ImageSizes,

    #[serde(default = "default_logo_sizes")]
    pub logo: ImageSizes,

    #[serde(default = "default_profile_sizes")]
    pub profile: ImageSizes,
}

fn default_poster_sizes() -> ImageSizes {
    ImageSizes::new(
        &["w92", "w154", "w185", "w342", "w500", "w780", "original"],
        "w500",
    )
}

fn default_backdrop_sizes() -> ImageSizes {
    ImageSizes::new(&["w300", "w780", "w1280", "original"], "w1280")
}

fn default_logo_sizes() -> ImageSizes {
    ImageSizes::new(
        &["w45", "w92", "w154", "w185", "w300", "w500", "original"],
        "w185",
    )
}

fn default_profile_sizes() -> ImageSizes {
    ImageSizes::new(&["w45", "w185", "h632", "original"], "w185")
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            poster: default_poster_sizes(),
            backdrop: default_backdrop_sizes(),
            logo: default_logo_sizes(),
            profile: default_profile_sizes(),
        }
    }
}
