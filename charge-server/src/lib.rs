//! Charging-station data gateway.
//!
//! An HTTP service in front of a rate-limited charging-station POI provider.
//! Nearby queries are cached per quantized coordinate bucket and soft-fail
//! when the provider is unavailable; a country-wide snapshot is cached and
//! minimized; an operator roster is built from persisted stations.

pub mod cache;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod ocm;
pub mod operators;
pub mod web;
