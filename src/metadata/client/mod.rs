//! Base TMDB API client.
//!
//! Every higher-level service goes through [`ApiClient::request`], which
//! composes the response cache, the shared rate limiter and the HTTP call:
//!
//! 1. cache hit: return immediately, no network, no rate-limit slot;
//! 2. miss: wait for the limiter, GET `base_url + endpoint` with bearer auth,
//!    retrying transport failures only;
//! 3. 2xx: decode, store under the resolved TTL, return;
//! 4. anything else: classify into a [`TmdbError`].

pub mod cache;
pub mod rate_limiter;

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::config::{CacheConfig, Config};
use crate::metadata::error::{Result, TmdbError};
use crate::metadata::types::{lenient, PaginationInfo};

pub use cache::{cache_key, CacheError, MemoryCache, ResponseCache};
pub use rate_limiter::RateLimiter;

/// Query parameters for one upstream call. Sorted, so the cache key is
/// independent of insertion order.
pub type QueryParams = BTreeMap<String, String>;

/// Build [`QueryParams`] from `(name, value)` pairs.
pub fn query_params<I, K, V>(pairs: I) -> QueryParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect()
}

/// How a call interacts with the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Neither read nor write the cache.
    Bypass,
    /// Listings and searches.
    Dynamic,
    /// Rarely-changing catalogue data (genres).
    Static,
    /// Explicit TTL override.
    Ttl(Duration),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: Arc<RateLimiter>,
    cache: Arc<dyn ResponseCache>,
    cache_config: CacheConfig,
    max_retries: u32,
    retry_delay: Duration,
}

impl ApiClient {
    /// Create a client with its own in-memory cache and rate limiter.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_parts(
            config,
            Arc::new(MemoryCache::new()),
            Arc::new(RateLimiter::new(config.rate_limiting.delay())),
        )
    }

    /// Create a client over an injected cache and limiter, so several
    /// clients can share one spacing budget.
    pub fn with_parts(
        config: &Config,
        cache: Arc<dyn ResponseCache>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let api_key = config.tmdb.api_key.trim();
        if api_key.is_empty() {
            error!("TMDB API key is not configured");
            return Err(TmdbError::Configuration(
                "TMDB API key is not configured".to_string(),
            ));
        }

        let base_url = config.tmdb.base_url.trim().trim_end_matches('/');
        reqwest::Url::parse(base_url).map_err(|e| {
            TmdbError::Configuration(format!("Invalid TMDB base URL '{base_url}': {e}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.tmdb.timeout())
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .build()
            .map_err(|e| TmdbError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            limiter,
            cache,
            cache_config: config.cache.clone(),
            max_retries: config.rate_limiting.max_retries,
            retry_delay: config.rate_limiting.retry_delay(),
        })
    }

    /// Fetch `endpoint` and return the decoded JSON payload.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &QueryParams,
        policy: CachePolicy,
    ) -> Result<Value> {
        let key = self.cache_key(endpoint, params);
        let ttl = self.resolve_ttl(policy);

        if ttl.is_some() {
            match self.cache.get(&key) {
                Ok(Some(cached)) => {
                    trace!(endpoint, "TMDB cache hit");
                    return Ok(cached);
                }
                Ok(None) => debug!(endpoint, "TMDB cache miss"),
                Err(e) => warn!(endpoint, error = %e, "Cache read failed, treating as miss"),
            }
        }

        self.limiter.enforce().await;

        let response = self.send(endpoint, params).await?;
        if !response.status().is_success() {
            return Err(self.classify_failure(endpoint, params, response).await);
        }

        let payload: Value = response.json().await.map_err(|e| {
            error!(endpoint, params = ?params, error = %e, "Failed to decode TMDB response");
            TmdbError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })?;

        if let Some(ttl) = ttl {
            if let Err(e) = self.cache.put(&key, payload.clone(), ttl) {
                warn!(endpoint, error = %e, "Failed to store TMDB response in cache");
            }
        }

        Ok(payload)
    }

    /// [`request`](Self::request) followed by a typed decode.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        policy: CachePolicy,
    ) -> Result<T> {
        let payload = self.request(endpoint, params, policy).await?;
        serde_json::from_value(payload).map_err(|e| {
            error!(endpoint, params = ?params, error = %e, "Unexpected TMDB payload shape");
            TmdbError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Drop the cached response for one call.
    pub fn invalidate(&self, endpoint: &str, params: &QueryParams) {
        let key = self.cache_key(endpoint, params);
        if let Err(e) = self.cache.forget(&key) {
            warn!(endpoint, error = %e, "Failed to invalidate TMDB cache entry");
        }
    }

    /// Evict every entry in this client's cache namespace.
    pub fn clear_cache(&self) {
        if let Err(e) = self.cache.clear(&self.cache_config.prefix) {
            warn!(error = %e, "Failed to clear TMDB cache");
        }
    }

    /// Pagination summary for a raw page payload.
    pub fn pagination_info(&self, payload: &Value) -> PaginationInfo {
        let int = |field: &str| payload.get(field).and_then(lenient::value_to_int);
        let page = int("page").unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let total_pages = int("total_pages").unwrap_or(1).clamp(0, u32::MAX as i64) as u32;
        let total_results = int("total_results").unwrap_or(0).max(0) as u64;
        PaginationInfo::new(page, total_pages, total_results)
    }

    pub fn cache_key(&self, endpoint: &str, params: &QueryParams) -> String {
        cache_key(&self.cache_config.prefix, endpoint, params)
    }

    fn resolve_ttl(&self, policy: CachePolicy) -> Option<Duration> {
        match policy {
            CachePolicy::Bypass => None,
            CachePolicy::Dynamic => Some(self.cache_config.dynamic_ttl()),
            CachePolicy::Static => Some(self.cache_config.static_ttl()),
            CachePolicy::Ttl(ttl) => Some(ttl),
        }
    }

    /// Issue the GET, retrying connection failures and timeouts only.
    async fn send(&self, endpoint: &str, params: &QueryParams) -> Result<reqwest::Response> {
        let url = if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };

        let mut attempt = 0u32;
        loop {
            let result = self
                .http
                .get(&url)
                .bearer_auth(&self.api_key)
                .header(ACCEPT, "application/json")
                .query(params)
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        endpoint,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "TMDB connection failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    error!(endpoint, params = ?params, error = %e, "TMDB connection error");
                    return Err(TmdbError::Connectivity { source: e });
                }
            }
        }
    }

    async fn classify_failure(
        &self,
        endpoint: &str,
        params: &QueryParams,
        response: reqwest::Response,
    ) -> TmdbError {
        let status = response.status().as_u16();
        let body: Option<Value> = response.json().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("status_message"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown TMDB API error")
            .to_string();

        error!(
            endpoint,
            params = ?params,
            status,
            message = %message,
            "TMDB API error"
        );

        TmdbError::from_status(status, endpoint, message)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
