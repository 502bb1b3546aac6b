use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crystal_alchemy::clock::SimulationClock;
use crystal_alchemy::dispatch::Dispatcher;
use crystal_alchemy::network::{http_api, GameServer};
use crystal_alchemy::resonance::{GeminiOracle, ResonanceController};
use crystal_alchemy::{GameConfig, GameState, GameStore};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env loaded: {}", e);
    }

    let mut config = GameConfig::load();
    if let Err(e) = config.validate() {
        warn!("Invalid config ({}), falling back to defaults", e);
        config = GameConfig::default();
    }

    let store = GameStore::new(GameState::new(&config));
    let _clock = SimulationClock::spawn(store.clone(), &config);

    let oracle = GeminiOracle::from_env(&config.resonance);
    let resonance = Arc::new(ResonanceController::new(
        store.clone(),
        oracle,
        config.resonance.clone(),
    ));
    let dispatcher = Dispatcher::new(store.clone(), resonance);

    tokio::spawn(http_api::start(config.server.http_addr.clone(), store.clone()));

    let server = GameServer::new(store, dispatcher, config.broadcast_period());
    tokio::select! {
        result = server.serve(&config.server.ws_addr) => {
            if let Err(e) = result {
                error!("Failed to bind {}: {}", config.server.ws_addr, e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }
}
