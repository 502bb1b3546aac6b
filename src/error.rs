use std::time::Duration;

use thiserror::Error;

use crate::game::resources::ResourceType;

/// Every way a game action or a resonance request can be turned down.
///
/// None of these are fatal: callers log them and the simulation keeps
/// ticking.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    #[error("not enough {resource} (need {needed}, have {available:.2})")]
    InsufficientFunds {
        resource: ResourceType,
        needed: f64,
        available: f64,
    },
    #[error("unknown upgrade id: {0}")]
    UnknownUpgrade(String),
    #[error("{0} is still locked")]
    ResourceLocked(ResourceType),
    #[error("amount must be non-negative, got {0}")]
    NegativeAmount(f64),
    #[error("an incantation is already being considered")]
    ResonanceInFlight,
    #[error("incantation text is empty")]
    EmptyIncantation,
    #[error("resonance request failed: {0}")]
    ResonanceRequestFailed(String),
    #[error("resonance request timed out after {0:?}")]
    ResonanceTimeout(Duration),
}
