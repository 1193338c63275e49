//! Application state for the web layer.

use std::sync::Arc;

use crate::gateway::{ChargingDataGateway, RegionalSnapshotCache};
use crate::operators::StationStore;

/// Shared application state.
///
/// Built once at startup; the caches inside live as long as the process.
#[derive(Clone)]
pub struct AppState {
    /// Nearby-stations gateway and its point-query cache
    pub gateway: Arc<ChargingDataGateway>,

    /// Country-wide snapshot cache
    pub regional: Arc<RegionalSnapshotCache>,

    /// External station store for the operator roster
    pub store: Arc<dyn StationStore>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        gateway: ChargingDataGateway,
        regional: RegionalSnapshotCache,
        store: Arc<dyn StationStore>,
    ) -> Self {
        Self {
            gateway: Arc::new(gateway),
            regional: Arc::new(regional),
            store,
        }
    }
}
