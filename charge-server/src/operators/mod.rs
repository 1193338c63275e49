//! Operator roster.
//!
//! Builds a deduplicated, sorted list of charging network operators from
//! the stations held in the external station store.

mod aggregate;
mod store;

pub use aggregate::{
    OperatorSummary, UNKNOWN_COUNTRY, UNKNOWN_OPERATOR, aggregate, aggregate_from_store,
};
pub use store::{
    InMemoryStationStore, JsonFileStationStore, OperatorRow, StationStore, StoreError,
};
