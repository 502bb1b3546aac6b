pub mod history;
pub mod production;
pub mod purchase;
pub mod resources;
pub mod state;
pub mod unlocks;
pub mod upgrades;

pub use history::{HistorySample, HistorySeries};
pub use production::ProductionCalculator;
pub use purchase::PurchaseReceipt;
pub use resources::{ResourceLedger, ResourceState, ResourceType};
pub use state::{GameState, IdleTick, ResonanceEffect, UpgradeView};
pub use unlocks::UnlockPolicy;
pub use upgrades::{Upgrade, UpgradeBook, UpgradeCategory};
