use serde::Serialize;
use tracing::debug;

use crate::error::GameError;

use super::resources::{ResourceLedger, ResourceType};
use super::upgrades::{Upgrade, UpgradeBook};

/// What a successful purchase paid and produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    pub upgrade_id: String,
    pub resource: ResourceType,
    pub cost: f64,
    pub new_level: u32,
}

/// Returns `true` if the ledger holds enough of the upgrade's cost resource
/// for its next level.
pub fn can_afford(upgrade: &Upgrade, ledger: &ResourceLedger) -> bool {
    ledger.get(upgrade.cost_resource).current >= upgrade.next_cost()
}

/// Buys one level of `upgrade_id`, debiting its cost from the ledger.
///
/// Either both the debit and the level bump happen, or neither does: all
/// checks run before anything is written.
pub fn purchase(
    upgrades: &mut UpgradeBook,
    ledger: &mut ResourceLedger,
    upgrade_id: &str,
) -> Result<PurchaseReceipt, GameError> {
    let upgrade = upgrades
        .get_mut(upgrade_id)
        .ok_or_else(|| GameError::UnknownUpgrade(upgrade_id.to_string()))?;

    let resource = upgrade.cost_resource;
    let cost = upgrade.next_cost();
    let available = ledger.get(resource).current;
    if available < cost {
        debug!(
            "Purchase of {} refused: need {} {}, have {:.2}",
            upgrade_id, cost, resource, available
        );
        return Err(GameError::InsufficientFunds {
            resource,
            needed: cost,
            available,
        });
    }

    ledger.debit(resource, cost)?;
    upgrade.level += 1;

    Ok(PurchaseReceipt {
        upgrade_id: upgrade.id.clone(),
        resource,
        cost,
        new_level: upgrade.level,
    })
}
