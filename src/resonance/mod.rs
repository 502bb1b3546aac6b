pub mod gemini;
pub mod prompts;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{FailurePolicy, ResonanceConfig};
use crate::error::GameError;
use crate::game::ResonanceEffect;
use crate::store::GameStore;

pub use gemini::GeminiOracle;

/// Ceiling applied when clamping is off, so production stays finite.
pub const MAX_UNCLAMPED_MULTIPLIER: f64 = 1_000_000.0;

// ── Collaborator contract ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncantationRequest {
    pub incantation_text: String,
    pub state_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlchemicalResponse {
    pub message: String,
    /// Documented as 1.0..=3.0 by the service, not guaranteed.
    pub bonus_multiplier: f64,
    pub unlocked_lore: String,
}

/// The remote text-generation service that judges incantations.
pub trait AlchemistOracle: Send + Sync + 'static {
    fn consult(
        &self,
        request: IncantationRequest,
    ) -> impl Future<Output = Result<AlchemicalResponse, GameError>> + Send;
}

// ── Controller ──────────────────────────────────────────────────────

/// How a finished incantation changed the game.
#[derive(Debug, Clone, PartialEq)]
pub enum ResonanceOutcome {
    /// The alchemist answered; dialogue and multiplier were replaced.
    Resonated { multiplier: f64, message: String },
    /// The request failed; the consolation line and 1.0 were written.
    FellBack { reason: GameError },
    /// The request failed; dialogue and multiplier were left alone.
    Preserved { reason: GameError },
}

pub struct ResonanceController<O> {
    store: GameStore,
    oracle: O,
    settings: ResonanceConfig,
}

impl<O: AlchemistOracle> ResonanceController<O> {
    pub fn new(store: GameStore, oracle: O, settings: ResonanceConfig) -> Self {
        Self {
            store,
            oracle,
            settings,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.settings.timeout_ms)
    }

    /// Sends `text` to the alchemist and applies the answer.
    ///
    /// Only one incantation may be in flight; a second call while one is
    /// pending fails with [`GameError::ResonanceInFlight`]. The result is
    /// merged into whatever the snapshot is when the answer arrives, not
    /// the snapshot the request started from.
    pub async fn cast_incantation(&self, text: &str) -> Result<ResonanceOutcome, GameError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::EmptyIncantation);
        }

        let state_summary = self.store.transition(|state| {
            state.begin_resonance()?;
            Ok(state.summary())
        })?;
        let pending = PendingGuard::new(&self.store);

        info!("Incantation cast: {:?}", text);
        let request = IncantationRequest {
            incantation_text: text.to_string(),
            state_summary,
        };

        let answer = match tokio::time::timeout(self.timeout(), self.oracle.consult(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(GameError::ResonanceTimeout(self.timeout())),
        };

        let (effect, outcome) = match answer.and_then(|resp| self.resolve(resp)) {
            Ok(effect) => {
                info!("Resonance accepted, multiplier now {:.2}", effect.multiplier);
                let outcome = ResonanceOutcome::Resonated {
                    multiplier: effect.multiplier,
                    message: effect.dialogue.clone(),
                };
                (Some(effect), outcome)
            }
            Err(reason) => {
                warn!("Resonance failed: {}", reason);
                match self.settings.failure_policy {
                    FailurePolicy::Fallback => {
                        (Some(fallback_effect()), ResonanceOutcome::FellBack { reason })
                    }
                    FailurePolicy::Preserve => (None, ResonanceOutcome::Preserved { reason }),
                }
            }
        };

        pending.finish(effect);
        Ok(outcome)
    }

    /// Turns a raw answer into the effect written to the snapshot.
    fn resolve(&self, resp: AlchemicalResponse) -> Result<ResonanceEffect, GameError> {
        if !resp.bonus_multiplier.is_finite() {
            return Err(GameError::ResonanceRequestFailed(format!(
                "non-finite multiplier {}",
                resp.bonus_multiplier
            )));
        }
        // Not f64::clamp, which panics on an inverted or NaN range.
        let multiplier = if self.settings.clamp {
            resp.bonus_multiplier
                .max(self.settings.min_multiplier)
                .min(self.settings.max_multiplier)
        } else {
            resp.bonus_multiplier.clamp(0.0, MAX_UNCLAMPED_MULTIPLIER)
        };
        Ok(ResonanceEffect {
            dialogue: resp.message,
            multiplier,
            lore: Some(resp.unlocked_lore).filter(|l| !l.trim().is_empty()),
        })
    }
}

fn fallback_effect() -> ResonanceEffect {
    ResonanceEffect {
        dialogue: prompts::FALLBACK_MESSAGE.to_string(),
        multiplier: 1.0,
        lore: Some(prompts::FALLBACK_LORE.to_string()),
    }
}

/// Clears the in-flight flag even if the incantation future is dropped
/// before the answer arrives.
struct PendingGuard<'a> {
    store: &'a GameStore,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(store: &'a GameStore) -> Self {
        Self { store, armed: true }
    }

    fn finish(mut self, effect: Option<ResonanceEffect>) {
        self.armed = false;
        self.store.update(|state| state.finish_resonance(effect));
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.update(|state| state.finish_resonance(None));
        }
    }
}
