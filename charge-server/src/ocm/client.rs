//! Open Charge Map HTTP client.
//!
//! Provides async methods for the `/poi` endpoint. Handles authentication,
//! request timeouts, a concurrency cap, and classification of the response
//! status into [`OcmError`] variants.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::error::OcmError;
use super::types::StationPoi;

/// Default base URL for the Open Charge Map API.
const DEFAULT_BASE_URL: &str = "https://api.openchargemap.io/v3";

/// Default maximum concurrent upstream requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// How much of an unparseable body is kept for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the Open Charge Map client.
#[derive(Debug, Clone)]
pub struct OcmConfig {
    /// API key. `None` means every request fails with `NotConfigured`.
    pub api_key: Option<String>,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OcmConfig {
    /// Create a config with production defaults and no API key.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point the client at another `/poi` host, such as a mirror or a fake
    /// upstream in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Cap the requests in flight across every clone of the client.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Time limit applied separately to the wait for a concurrency slot and
    /// to the HTTP exchange itself, so a call can take up to twice this.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OcmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of a radius search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest<'a> {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in kilometres, forwarded verbatim.
    pub distance: &'a str,
    pub max_results: u32,
}

/// Parameters of a country-wide search.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalRequest<'a> {
    pub country_code: &'a str,
    pub max_results: u32,
    /// Upstream `boundingbox` value, e.g. `"(41.3,28.5),(40.8,29.4)"`.
    pub bounding_box: Option<&'a str>,
}

/// Open Charge Map API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// concurrency limit.
#[derive(Debug, Clone)]
pub struct OcmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl OcmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OcmConfig) -> Result<Self, OcmError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.is_empty()),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            timeout,
        })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search for stations around a point.
    ///
    /// Returns the upstream records untouched.
    pub async fn fetch_nearby(
        &self,
        request: &NearbyRequest<'_>,
    ) -> Result<Vec<serde_json::Value>, OcmError> {
        let query = vec![
            ("latitude", request.latitude.to_string()),
            ("longitude", request.longitude.to_string()),
            ("distance", request.distance.to_string()),
            ("distanceunit", "KM".to_string()),
            ("maxresults", request.max_results.to_string()),
        ];

        self.get_poi(query).await
    }

    /// Fetch every station in a country, optionally within a bounding box.
    ///
    /// Records that do not decode as a POI are skipped with a warning.
    pub async fn fetch_regional(
        &self,
        request: &RegionalRequest<'_>,
    ) -> Result<Vec<StationPoi>, OcmError> {
        let mut query = vec![
            ("countrycode", request.country_code.to_string()),
            ("maxresults", request.max_results.to_string()),
        ];
        if let Some(bbox) = request.bounding_box {
            query.push(("boundingbox", bbox.to_string()));
        }

        let records: Vec<serde_json::Value> = self.get_poi(query).await?;
        let total = records.len();

        let pois: Vec<StationPoi> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(poi) => Some(poi),
                Err(e) => {
                    debug!(index, error = %e, "skipping undecodable POI");
                    None
                }
            })
            .collect();

        if pois.len() < total {
            warn!(skipped = total - pois.len(), total, "regional batch had bad records");
        }

        Ok(pois)
    }

    /// Issue a `/poi` request and decode the body.
    async fn get_poi<T: DeserializeOwned>(
        &self,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<T, OcmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| OcmError::NotConfigured("OCM_API_KEY is not set".to_string()))?;

        let _permit = tokio::time::timeout(self.timeout, self.semaphore.acquire())
            .await
            .map_err(|_| OcmError::SlotTimeout(self.timeout))?
            .map_err(|_| OcmError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        query.push(("output", "json".to_string()));
        query.push(("key", api_key.clone()));

        let url = format!("{}/poi/", self.base_url);
        debug!(%url, "requesting POIs");

        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OcmError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| OcmError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
        })
    }
}
