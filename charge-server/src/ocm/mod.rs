//! Open Charge Map client.
//!
//! Open Charge Map is the upstream POI provider for charging stations.
//! It is rate-limited per API key, so everything above this module tries
//! hard not to call it.
//!
//! Key characteristics:
//! - a single `/poi` endpoint serves both radius and country queries
//! - 429 signals rate limiting and is reported separately from other failures
//! - records are large; clients usually need a small subset (see [`minimize`])

mod client;
mod error;
mod types;

pub use client::{NearbyRequest, OcmClient, OcmConfig, RegionalRequest};
pub use error::OcmError;
pub use types::{
    AddressInfo, Connection, MinimalAddress, MinimalConnection, MinimalOperator, MinimalStation,
    OperatorInfo, StationPoi, minimize,
};
