//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::operators::OperatorSummary;

/// Query string of `/charging-stations/nearby`.
///
/// Everything is optional at this level so that missing coordinates produce
/// our own 400 body instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Radius in kilometres
    pub distance: Option<String>,
    pub maxresults: Option<String>,
}

/// Query string of `/charging-stations/regional`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalParams {
    pub bounding_box: Option<String>,
}

/// Response for the operator roster.
#[derive(Debug, Serialize)]
pub struct OperatorsResponse {
    pub success: bool,
    pub total: usize,
    pub operators: Vec<OperatorSummary>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Only present on endpoints whose success body carries the flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
}

/// Cache statistics.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub nearby: CacheStats,
    pub regional: RegionalStats,
}

#[derive(Debug, Serialize)]
pub struct RegionalStats {
    pub entries: u64,
}
