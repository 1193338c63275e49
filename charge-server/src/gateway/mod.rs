//! Cached access to charging-station data.
//!
//! Two tiers sit in front of the upstream provider:
//! - [`ChargingDataGateway`]: fine-grained nearby queries, cached per
//!   quantized coordinate bucket for 5 minutes, soft-failing on upstream errors
//! - [`RegionalSnapshotCache`]: one country-wide snapshot per bounding-box
//!   variant, cached for an hour, minimized, and hard-failing

mod error;
mod nearby;
mod regional;

pub use error::{GatewayError, RegionalError};
pub use nearby::{
    CacheStatus, ChargingDataGateway, DEFAULT_DISTANCE, DEFAULT_MAX_RESULTS, NearbyOutcome,
    NearbyPayload, NearbyQuery, RATE_LIMIT_RETRY_AFTER,
};
pub use regional::{RegionalConfig, RegionalPayload, RegionalSnapshotCache};
