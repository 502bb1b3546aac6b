use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::game::ResourceType;
use crate::store::GameStore;

/// Drives the two timer-based producers: idle production and history
/// sampling. Each runs in its own task so neither can stall the other or
/// the player's actions.
///
/// A late tick still pays exactly one nominal period of production; there
/// is no catch-up for scheduler delay.
pub struct SimulationClock {
    production: JoinHandle<()>,
    history: JoinHandle<()>,
}

impl SimulationClock {
    pub fn spawn(store: GameStore, config: &GameConfig) -> Self {
        let tick_period = config.tick_period();
        let history_period = config.history_period();

        info!(
            "Simulation clock started: tick every {:?}, history every {:?}",
            tick_period, history_period
        );

        let production = tokio::spawn(run_production(store.clone(), tick_period));
        let history = tokio::spawn(run_history(store, history_period));

        Self {
            production,
            history,
        }
    }

    /// Stops both tasks.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.production.abort();
        self.history.abort();
    }
}

async fn run_production(store: GameStore, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    ticker.tick().await;

    let period_secs = period.as_secs_f64();
    let mut known: BTreeSet<ResourceType> = store.snapshot().unlocked_types();

    loop {
        ticker.tick().await;
        match store.transition(|state| state.idle_tick(period_secs)) {
            Ok(tick) => {
                for resource in tick.unlocked.difference(&known) {
                    info!("{} unlocked", resource);
                }
                known = tick.unlocked;
            }
            Err(e) => warn!("Idle tick skipped: {}", e),
        }
    }
}

async fn run_history(store: GameStore, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let sample = store.update(|state| state.sample_history(now_ms()));
        debug!("History sample: {:.2}", sample.total_value);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    fn store_with_golems(golems: u32) -> GameStore {
        let mut state = GameState::default();
        state.upgrades.get_mut("auto_1").unwrap().level = golems;
        GameStore::new(state)
    }

    #[tokio::test(start_paused = true)]
    async fn one_second_of_ticks_pays_one_second_of_production() {
        let store = store_with_golems(10);
        let clock = SimulationClock::spawn(store.clone(), &GameConfig::default());

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        clock.shutdown();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.ticks, 10);
        let quartz = snapshot.ledger.get(ResourceType::Quartz).current;
        assert!((quartz - 10.0).abs() < 1e-9, "got {quartz}");
    }

    #[tokio::test(start_paused = true)]
    async fn reward_follows_the_configured_period() {
        let store = store_with_golems(10);
        let config = GameConfig {
            tick_period_ms: 250,
            ..GameConfig::default()
        };
        let clock = SimulationClock::spawn(store.clone(), &config);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        clock.shutdown();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.ticks, 4);
        let quartz = snapshot.ledger.get(ResourceType::Quartz).current;
        assert!((quartz - 10.0).abs() < 1e-9, "got {quartz}");
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_sampled_and_bounded() {
        let store = store_with_golems(1);
        let config = GameConfig {
            history_period_ms: 1_000,
            history_capacity: 3,
            ..GameConfig::default()
        };
        let clock = SimulationClock::spawn(store.clone(), &config);

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        clock.shutdown();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(snapshot.history.capacity(), 3);
        let values: Vec<f64> = snapshot.history.iter().map(|s| s.total_value).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking() {
        let store = store_with_golems(1);
        let clock = SimulationClock::spawn(store.clone(), &GameConfig::default());
        tokio::time::sleep(Duration::from_millis(350)).await;
        clock.shutdown();
        let ticks = store.snapshot().ticks;
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.snapshot().ticks, ticks);
    }
}
