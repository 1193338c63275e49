//! Nearby-stations query with quantized caching.
//!
//! The consuming map must stay usable while the upstream provider is
//! degraded, so every upstream failure becomes an empty result. Only caller
//! mistakes (missing coordinates) and a missing API key are hard errors.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, CacheStats, QuantizedCache};
use crate::domain::GeoCacheKey;
use crate::ocm::{NearbyRequest, OcmClient, OcmError};

use super::error::GatewayError;

/// Radius used when the caller does not send one (kilometres).
pub const DEFAULT_DISTANCE: &str = "50";

/// Result cap used when the caller does not send one.
pub const DEFAULT_MAX_RESULTS: u32 = 30;

/// Suggested client back-off after an upstream 429.
pub const RATE_LIMIT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Raw upstream POI records, shared between the cache and responses.
pub type NearbyPayload = Arc<Vec<serde_json::Value>>;

/// A validated nearby-stations query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    /// Radius in kilometres, kept as sent. Part of the cache key verbatim.
    pub distance: String,
    pub max_results: u32,
}

impl NearbyQuery {
    /// Create a query with the default radius and result cap.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            distance: DEFAULT_DISTANCE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set the radius.
    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = distance.into();
        self
    }

    /// Set the result cap.
    pub fn with_max_results(mut self, n: u32) -> Self {
        self.max_results = n;
        self
    }

    /// Validate raw query-string values.
    ///
    /// `lat` and `lng` are required finite numbers. Empty `distance` or
    /// `maxresults` values fall back to the defaults.
    pub fn parse(
        lat: Option<&str>,
        lng: Option<&str>,
        distance: Option<&str>,
        max_results: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let (Some(lat), Some(lng)) = (non_empty(lat), non_empty(lng)) else {
            return Err(GatewayError::MissingCoordinates);
        };

        let mut query = Self::new(parse_coordinate("lat", lat)?, parse_coordinate("lng", lng)?);

        if let Some(distance) = non_empty(distance) {
            query.distance = distance.to_string();
        }

        if let Some(raw) = non_empty(max_results) {
            query.max_results = raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| GatewayError::InvalidParameter {
                    name: "maxresults",
                    value: raw.to_string(),
                })?;
        }

        Ok(query)
    }

    /// The cache bucket this query falls into.
    pub fn cache_key(&self) -> GeoCacheKey {
        GeoCacheKey::quantize(self.lat, self.lng, &self.distance)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_coordinate(name: &'static str, raw: &str) -> Result<f64, GatewayError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GatewayError::InvalidParameter {
            name,
            value: raw.to_string(),
        })
}

/// How a response relates to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache.
    Hit,
    /// Fetched upstream and cached.
    Miss,
    /// Upstream failed; nothing was cached.
    Bypass,
}

impl CacheStatus {
    /// Header value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// Outcome of a nearby query.
///
/// Keeps "no stations" and "upstream unavailable" apart even though both
/// reach the client as an empty array.
#[derive(Debug, Clone)]
pub enum NearbyOutcome {
    Hit(NearbyPayload),
    Miss(NearbyPayload),
    /// Upstream answered 429. Not cached.
    RateLimited { retry_after: Duration },
    /// Upstream failed or was unreachable. Not cached.
    Degraded,
}

impl NearbyOutcome {
    /// Stations to return. Empty for degraded outcomes.
    pub fn stations(&self) -> &[serde_json::Value] {
        match self {
            NearbyOutcome::Hit(payload) | NearbyOutcome::Miss(payload) => payload.as_slice(),
            NearbyOutcome::RateLimited { .. } | NearbyOutcome::Degraded => &[],
        }
    }

    pub fn cache_status(&self) -> CacheStatus {
        match self {
            NearbyOutcome::Hit(_) => CacheStatus::Hit,
            NearbyOutcome::Miss(_) => CacheStatus::Miss,
            NearbyOutcome::RateLimited { .. } | NearbyOutcome::Degraded => CacheStatus::Bypass,
        }
    }

    /// Suggested back-off, only for rate-limited outcomes.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            NearbyOutcome::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether the upstream could not be consulted.
    pub fn is_degraded(&self) -> bool {
        self.cache_status() == CacheStatus::Bypass
    }
}

/// Gateway for nearby-station lookups.
///
/// Wraps an `OcmClient` and caches successful responses per quantized key.
/// Concurrent misses on the same key each go upstream; the last response
/// to arrive wins the cache slot.
pub struct ChargingDataGateway {
    client: OcmClient,
    cache: QuantizedCache<GeoCacheKey, NearbyPayload>,
}

impl ChargingDataGateway {
    /// Create a gateway with an empty cache.
    pub fn new(client: OcmClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: QuantizedCache::new(cache_config),
        }
    }

    /// Find stations around a point, using the cache if possible.
    pub async fn get_nearby(&self, query: &NearbyQuery) -> Result<NearbyOutcome, GatewayError> {
        let key = query.cache_key();

        if let Some(cached) = self.cache.lookup(&key).await {
            debug!(%key, "nearby cache hit");
            return Ok(NearbyOutcome::Hit(cached));
        }

        let request = NearbyRequest {
            latitude: query.lat,
            longitude: query.lng,
            distance: &query.distance,
            max_results: query.max_results,
        };

        match self.client.fetch_nearby(&request).await {
            Ok(stations) => {
                let payload = Arc::new(stations);
                self.cache.store(key, payload.clone()).await;
                Ok(NearbyOutcome::Miss(payload))
            }
            Err(OcmError::NotConfigured(message)) => Err(GatewayError::NotConfigured(message)),
            Err(OcmError::RateLimited) => {
                info!(%key, "upstream rate limited nearby query");
                Ok(NearbyOutcome::RateLimited {
                    retry_after: RATE_LIMIT_RETRY_AFTER,
                })
            }
            Err(e) => {
                warn!(%key, error = %e, "nearby query failed upstream, returning no stations");
                Ok(NearbyOutcome::Degraded)
            }
        }
    }

    /// Cache counters.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drop all cached responses.
    pub async fn invalidate_cache(&self) {
        self.cache.clear().await;
    }
}
