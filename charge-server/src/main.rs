use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use charge_server::config::ServerConfig;
use charge_server::gateway::{ChargingDataGateway, RegionalSnapshotCache};
use charge_server::ocm::OcmClient;
use charge_server::operators::{InMemoryStationStore, JsonFileStationStore, StationStore};
use charge_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if config.ocm.api_key.is_none() {
        warn!("OCM_API_KEY not set. Station queries will fail with 500.");
    }

    // One client shared by both cache tiers, so they share the upstream
    // concurrency limit.
    let client = OcmClient::new(config.ocm.clone()).expect("Failed to create OCM client");
    let gateway = ChargingDataGateway::new(client.clone(), &config.nearby_cache);
    let regional = RegionalSnapshotCache::new(client, &config.regional);

    let store: Arc<dyn StationStore> = match &config.store_path {
        Some(path) => {
            info!(path = %path.display(), "reading operator data from station file");
            Arc::new(JsonFileStationStore::new(path))
        }
        None => {
            warn!("STATION_STORE_PATH not set. Operator roster will be empty.");
            Arc::new(InMemoryStationStore::default())
        }
    };

    let state = AppState::new(gateway, regional, store);
    let app = create_router(state);

    let addr = config.bind_addr;
    info!("Charging station gateway listening on http://{addr}");
    info!("  GET /health                      - Health check");
    info!("  GET /charging-stations/nearby    - Stations around lat/lng");
    info!("  GET /charging-stations/regional  - Country-wide snapshot");
    info!("  GET /operators                   - Operator roster");
    info!("  GET /cache/stats                 - Cache counters");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
