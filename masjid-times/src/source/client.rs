//! HTTP client for place pages on the source site.
//!
//! Fetches the public page of a place, pulls the confData payload out of
//! it and keeps it in the cache store. This is the only component that
//! talks to the network.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::domain::{ConfData, PlaceId};
use crate::error::PrayerError;

use super::script::extract_conf_data;

/// Default base URL of the source site.
const DEFAULT_BASE_URL: &str = "https://mawaqit.net";

/// Default language segment of page URLs.
const DEFAULT_LANGUAGE: &str = "fr";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Configuration for the source fetcher.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the site (defaults to production)
    pub base_url: String,
    /// Language path segment placed before the place identifier
    pub language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Create a config pointing at the production site.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the language path segment.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache-or-fetch resolver for confData payloads.
#[derive(Clone)]
pub struct SourceFetcher {
    http: reqwest::Client,
    base_url: String,
    language: String,
    cache: CacheStore,
}

impl SourceFetcher {
    /// Create a fetcher with the given configuration and cache.
    pub fn new(config: SourceConfig, cache: CacheStore) -> Result<Self, PrayerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language,
            cache,
        })
    }

    /// URL of the public page for `place`.
    pub fn page_url(&self, place: &PlaceId) -> String {
        format!("{}/{}/{}", self.base_url, self.language, place.as_str())
    }

    /// Get the confData payload for a place.
    ///
    /// Served from cache when a live, decodable entry exists. Otherwise the
    /// page is fetched, the payload extracted, and written back to the
    /// cache (best effort).
    ///
    /// # Errors
    ///
    /// * `NotFound` if the site answers 404
    /// * `Upstream` for any other non-success status
    /// * `ServerDataMissing` if the page carries no decodable payload
    /// * `Timeout` / `Transport` for network failures
    pub async fn fetch(&self, place: &PlaceId) -> Result<ConfData, PrayerError> {
        if let Some(conf) = self.cached(place).await {
            return Ok(conf);
        }

        let conf = self.fetch_live(place).await?;

        match serde_json::to_string(&conf) {
            Ok(json) => self.cache.set(place.as_str(), json).await,
            Err(e) => warn!(place = %place, error = %e, "failed to serialize payload for cache"),
        }

        Ok(conf)
    }

    /// Decode a cached payload, discarding entries that no longer decode.
    async fn cached(&self, place: &PlaceId) -> Option<ConfData> {
        let json = self.cache.get(place.as_str()).await?;
        match serde_json::from_str(&json) {
            Ok(conf) => Some(conf),
            Err(e) => {
                warn!(place = %place, error = %e, "discarding corrupt cache entry");
                None
            }
        }
    }

    /// Fetch and decode the payload from the site, bypassing the cache.
    pub async fn fetch_live(&self, place: &PlaceId) -> Result<ConfData, PrayerError> {
        let url = self.page_url(place);
        debug!(%url, "fetching place page");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PrayerError::NotFound {
                place: place.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrayerError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;

        let conf = extract_conf_data(&body).map_err(|e| PrayerError::ServerDataMissing {
            place: place.to_string(),
            reason: e.to_string(),
        })?;

        info!(place = %place, months = conf.calendar.len(), "fetched confData");
        Ok(conf)
    }
}
