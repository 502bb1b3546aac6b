use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::config::GameConfig;
use crate::error::GameError;

use super::history::{HistorySample, HistorySeries};
use super::production::ProductionCalculator;
use super::purchase::{self, PurchaseReceipt};
use super::resources::{ResourceLedger, ResourceType};
use super::unlocks::UnlockPolicy;
use super::upgrades::{UpgradeBook, UpgradeCategory};

pub const OPENING_DIALOGUE: &str = "Ah, another apprentice! The crystals won't mine themselves, you know. Tap that Quartz and let's get started!";

// ── Transition results ──────────────────────────────────────────────

/// Outcome of one idle production tick.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleTick {
    /// Total reward produced by this tick.
    pub reward: f64,
    /// Amount credited to each unlocked type.
    pub share: f64,
    pub unlocked: BTreeSet<ResourceType>,
}

/// A resolved resonance, ready to be written into the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResonanceEffect {
    pub dialogue: String,
    pub multiplier: f64,
    pub lore: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: UpgradeCategory,
    pub level: u32,
    pub effect_per_level: f64,
    pub cost_resource: ResourceType,
    pub next_cost: f64,
    pub affordable: bool,
}

// ── Game state ──────────────────────────────────────────────────────

/// One complete, self-consistent snapshot of the game.
///
/// Every method that takes `&mut self` is a transition. The store runs it
/// on a private copy and only publishes the copy if the transition returns
/// `Ok`, so a failed transition never leaves half its writes behind.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub ledger: ResourceLedger,
    pub upgrades: UpgradeBook,
    pub unlocks: UnlockPolicy,
    pub multiplier: f64,
    pub dialogue: String,
    pub last_lore: Option<String>,
    pub lore_journal: VecDeque<String>,
    pub lore_capacity: usize,
    pub history: HistorySeries,
    pub selected: ResourceType,
    pub resonance_pending: bool,
    pub ticks: u64,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            ledger: ResourceLedger::new(),
            upgrades: UpgradeBook::from_catalogue(),
            unlocks: config.unlock_policy(),
            multiplier: 1.0,
            dialogue: OPENING_DIALOGUE.to_string(),
            last_lore: None,
            lore_journal: VecDeque::new(),
            lore_capacity: config.resonance.lore_capacity,
            history: HistorySeries::new(config.history_capacity),
            selected: config.base_resource,
            resonance_pending: false,
            ticks: 0,
        }
    }

    // ── Derived values ──────────────────────────────────────────────

    pub fn production(&self) -> ProductionCalculator<'_> {
        ProductionCalculator::new(&self.upgrades, self.multiplier)
    }

    pub fn per_click(&self) -> f64 {
        self.production().per_click()
    }

    pub fn per_second(&self) -> f64 {
        self.production().per_second()
    }

    pub fn base_lifetime(&self) -> f64 {
        self.ledger.get(self.unlocks.base()).lifetime
    }

    pub fn unlocked_types(&self) -> BTreeSet<ResourceType> {
        self.unlocks.unlocked_types(self.base_lifetime())
    }

    pub fn is_unlocked(&self, resource: ResourceType) -> bool {
        self.unlocks.is_unlocked(resource, self.base_lifetime())
    }

    pub fn upgrade_views(&self) -> Vec<UpgradeView> {
        self.upgrades
            .iter()
            .map(|u| UpgradeView {
                id: u.id.clone(),
                name: u.name.clone(),
                description: u.description.clone(),
                category: u.category,
                level: u.level,
                effect_per_level: u.effect_per_level,
                cost_resource: u.cost_resource,
                next_cost: u.next_cost(),
                affordable: purchase::can_afford(u, &self.ledger),
            })
            .collect()
    }

    /// Short description of the game handed to the alchemist with every
    /// incantation.
    pub fn summary(&self) -> String {
        let current = self
            .ledger
            .iter()
            .map(|(r, s)| format!("{}: {:.0}", r, s.current))
            .collect::<Vec<_>>()
            .join(", ");
        let lifetime = self
            .ledger
            .iter()
            .map(|(r, s)| format!("{}: {:.0}", r, s.lifetime))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Crystals: {{{}}}. Upgrades: {} active. Total mined: {{{}}}",
            current,
            self.upgrades.leveled_count(),
            lifetime
        )
    }

    // ── Player actions ──────────────────────────────────────────────

    /// Mines the selected resource once. Returns the amount credited.
    pub fn click(&mut self) -> Result<f64, GameError> {
        let amount = saturate(self.per_click());
        self.ledger.credit(self.selected, amount)?;
        Ok(amount)
    }

    pub fn select_resource(&mut self, resource: ResourceType) -> Result<(), GameError> {
        if !self.is_unlocked(resource) {
            return Err(GameError::ResourceLocked(resource));
        }
        self.selected = resource;
        Ok(())
    }

    pub fn purchase(&mut self, upgrade_id: &str) -> Result<PurchaseReceipt, GameError> {
        purchase::purchase(&mut self.upgrades, &mut self.ledger, upgrade_id)
    }

    // ── Clock-driven transitions ────────────────────────────────────

    /// Produces `per_second * period_secs` and splits it evenly across the
    /// types unlocked at the start of the tick.
    pub fn idle_tick(&mut self, period_secs: f64) -> Result<IdleTick, GameError> {
        self.ticks += 1;
        let reward = saturate(self.per_second() * period_secs);
        let unlocked = self.unlocked_types();
        if unlocked.is_empty() {
            return Ok(IdleTick {
                reward: 0.0,
                share: 0.0,
                unlocked,
            });
        }
        let share = reward / unlocked.len() as f64;
        if share > 0.0 {
            for &resource in &unlocked {
                self.ledger.credit(resource, share)?;
            }
        }
        Ok(IdleTick {
            reward,
            share,
            unlocked,
        })
    }

    pub fn sample_history(&mut self, timestamp_ms: u64) -> HistorySample {
        let sample = HistorySample {
            timestamp_ms,
            total_value: self.ledger.total_current(),
        };
        self.history.push(sample);
        sample
    }

    // ── Resonance ───────────────────────────────────────────────────

    /// Marks an incantation as in flight. Fails if one already is.
    pub fn begin_resonance(&mut self) -> Result<(), GameError> {
        if self.resonance_pending {
            return Err(GameError::ResonanceInFlight);
        }
        self.resonance_pending = true;
        Ok(())
    }

    /// Clears the in-flight flag and, if given, writes the effect. Dialogue
    /// and multiplier always change together.
    pub fn finish_resonance(&mut self, effect: Option<ResonanceEffect>) {
        self.resonance_pending = false;
        let Some(effect) = effect else {
            return;
        };
        self.dialogue = effect.dialogue;
        self.multiplier = effect.multiplier.max(0.0);
        if let Some(lore) = effect.lore {
            if self.lore_capacity > 0 {
                while self.lore_journal.len() >= self.lore_capacity {
                    self.lore_journal.pop_front();
                }
                self.lore_journal.push_back(lore.clone());
            }
            self.last_lore = Some(lore);
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Pins a yield into `[0, f64::MAX]`. NaN yields nothing.
fn saturate(amount: f64) -> f64 {
    if amount.is_nan() {
        0.0
    } else {
        amount.clamp(0.0, f64::MAX)
    }
}
