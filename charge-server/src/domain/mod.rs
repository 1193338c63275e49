//! Domain types for the charging-station gateway.

mod geo;

pub use geo::GeoCacheKey;
