//! Country-wide station snapshot.
//!
//! Backs the initial full-map load. Unlike nearby queries, failures are
//! surfaced: an empty map would be indistinguishable from a country with
//! no chargers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, info};

use crate::cache::REGIONAL_TTL;
use crate::ocm::{MinimalStation, OcmClient, RegionalRequest, minimize};

use super::error::RegionalError;

/// Minimized stations, shared between the cache and responses.
pub type RegionalPayload = Arc<Vec<MinimalStation>>;

/// Cache key: the bounding box, or `None` for the whole country.
type RegionKey = Option<String>;

/// Configuration for the regional snapshot.
#[derive(Debug, Clone)]
pub struct RegionalConfig {
    /// ISO country code the snapshot is scoped to.
    pub country_code: String,

    /// Upstream result cap.
    pub max_results: u32,

    /// How long a snapshot is served before refetching.
    pub ttl: Duration,

    /// Maximum number of bounding-box variants kept.
    pub max_variants: u64,
}

impl RegionalConfig {
    /// Create a config for the given country with default limits.
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            max_results: 5000,
            ttl: REGIONAL_TTL,
            max_variants: 64,
        }
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self::new("TR")
    }
}

/// Regional snapshot with a coarse, variant-keyed cache.
pub struct RegionalSnapshotCache {
    client: OcmClient,
    snapshots: MokaCache<RegionKey, RegionalPayload>,
    country_code: String,
    max_results: u32,
}

impl RegionalSnapshotCache {
    /// Create a snapshot cache with the given configuration.
    pub fn new(client: OcmClient, config: &RegionalConfig) -> Self {
        let snapshots = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_variants)
            .build();

        Self {
            client,
            snapshots,
            country_code: config.country_code.clone(),
            max_results: config.max_results,
        }
    }

    /// Get the minimized station list, optionally within a bounding box.
    ///
    /// Failures are returned as errors and never cached.
    pub async fn get_regional(
        &self,
        bounding_box: Option<&str>,
    ) -> Result<RegionalPayload, RegionalError> {
        let key: RegionKey = bounding_box
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        if let Some(cached) = self.snapshots.get(&key).await {
            debug!(bounding_box = ?key, "regional cache hit");
            return Ok(cached);
        }

        let request = RegionalRequest {
            country_code: &self.country_code,
            max_results: self.max_results,
            bounding_box: key.as_deref(),
        };
        let pois = self.client.fetch_regional(&request).await?;

        let stations = Arc::new(minimize(pois));
        info!(
            bounding_box = ?key,
            stations = stations.len(),
            "fetched regional snapshot"
        );

        self.snapshots.insert(key, stations.clone()).await;

        Ok(stations)
    }

    /// Number of cached variants. Approximate until pending tasks run.
    pub fn entry_count(&self) -> u64 {
        self.snapshots.entry_count()
    }

    /// Invalidate all cached snapshots.
    pub fn invalidate_all(&self) {
        self.snapshots.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocm::{OcmConfig, OcmError};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn snapshot_for(server: &MockServer) -> RegionalSnapshotCache {
        let config = OcmConfig::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        RegionalSnapshotCache::new(OcmClient::new(config).unwrap(), &RegionalConfig::default())
    }

    fn upstream_body() -> serde_json::Value {
        json!([{
            "ID": 77,
            "UsageCost": "free",
            "AddressInfo": {
                "Title": "Ankara Station",
                "AddressLine1": "Ataturk Blv. 1",
                "Town": "Ankara",
                "Latitude": 39.93,
                "Longitude": 32.85
            },
            "OperatorInfo": { "ID": 9, "Title": "Esarj" },
            "Connections": [{ "ID": 1, "PowerKW": 50.0, "CurrentTypeID": 30, "Amps": 125 }]
        }])
    }

    #[test]
    fn default_config() {
        let config = RegionalConfig::default();
        assert_eq!(config.country_code, "TR");
        assert_eq!(config.max_results, 5000);
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_variants, 64);
    }

    #[tokio::test]
    async fn returns_minimized_stations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/poi/"))
            .and(query_param("countrycode", "TR"))
            .and(query_param("maxresults", "5000"))
            .and(query_param_is_missing("boundingbox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
            .expect(1)
            .mount(&server)
            .await;

        let stations = snapshot_for(&server).get_regional(None).await.unwrap();
        assert_eq!(
            serde_json::to_value(&*stations).unwrap(),
            json!([{
                "ID": 77,
                "AddressInfo": {
                    "Title": "Ankara Station",
                    "Latitude": 39.93,
                    "Longitude": 32.85,
                    "AddressLine1": "Ataturk Blv. 1"
                },
                "OperatorInfo": { "Title": "Esarj" },
                "Connections": [{ "PowerKW": 50.0, "CurrentTypeID": 30 }]
            }])
        );
    }

    #[tokio::test]
    async fn snapshot_is_cached_per_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param_is_missing("boundingbox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("boundingbox", "(41.3,28.5),(40.8,29.4)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = snapshot_for(&server);
        let whole = snapshot.get_regional(None).await.unwrap();
        // An empty bounding box is the whole-country variant.
        let again = snapshot.get_regional(Some("")).await.unwrap();
        assert!(Arc::ptr_eq(&whole, &again));

        let boxed = snapshot
            .get_regional(Some("(41.3,28.5),(40.8,29.4)"))
            .await
            .unwrap();
        assert!(boxed.is_empty());
        snapshot
            .get_regional(Some("(41.3,28.5),(40.8,29.4)"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn record_without_coordinates_does_not_fail_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "ID": 1, "AddressInfo": { "Title": "Placed", "Latitude": 41.0, "Longitude": 29.0 } },
                { "ID": 2, "AddressInfo": { "Title": "Unplaced" } }
            ])))
            .mount(&server)
            .await;

        let stations = snapshot_for(&server).get_regional(None).await.unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].address_info.latitude, Some(41.0));
        assert_eq!(stations[1].address_info.latitude, None);
        assert_eq!(stations[1].address_info.longitude, None);
        assert_eq!(stations[1].address_info.title.as_deref(), Some("Unplaced"));
    }

    #[tokio::test]
    async fn snapshot_expires_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
            .expect(2)
            .mount(&server)
            .await;

        let config = OcmConfig::new()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        let snapshot = RegionalSnapshotCache::new(
            OcmClient::new(config).unwrap(),
            &RegionalConfig::default().with_ttl(Duration::from_millis(100)),
        );

        snapshot.get_regional(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        snapshot.get_regional(None).await.unwrap();
    }

    #[tokio::test]
    async fn upstream_failure_is_a_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&server)
            .await;

        let snapshot = snapshot_for(&server);
        let err = snapshot.get_regional(None).await.unwrap_err();
        assert!(matches!(err.upstream(), OcmError::Api { status: 502, .. }));

        // Failures are not cached.
        assert!(snapshot.get_regional(None).await.is_err());
    }

    #[tokio::test]
    async fn rate_limit_is_a_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = snapshot_for(&server).get_regional(None).await.unwrap_err();
        assert!(matches!(err.upstream(), OcmError::RateLimited));
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let client = OcmClient::new(OcmConfig::new().with_base_url("http://127.0.0.1:9")).unwrap();
        let snapshot = RegionalSnapshotCache::new(client, &RegionalConfig::default());

        let err = snapshot.get_regional(None).await.unwrap_err();
        assert!(err.upstream().is_configuration());
    }

    #[tokio::test]
    async fn invalidate_all_forces_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
            .expect(2)
            .mount(&server)
            .await;

        let snapshot = snapshot_for(&server);
        snapshot.get_regional(None).await.unwrap();
        snapshot.invalidate_all();
        snapshot.get_regional(None).await.unwrap();
    }
}
