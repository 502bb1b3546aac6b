//! Melvin's Crystals: an idle crystal-mining game served over WebSocket.
//!
//! The simulation lives in [`game`] and is owned by a [`store::GameStore`].
//! [`clock::SimulationClock`] ticks idle production, [`dispatch`] applies
//! player actions, and [`resonance`] talks to the remote alchemist.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod game;
pub mod network;
pub mod protocol;
pub mod resonance;
pub mod store;

pub use config::GameConfig;
pub use error::GameError;
pub use game::GameState;
pub use store::GameStore;
