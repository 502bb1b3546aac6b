use serde::{Deserialize, Serialize};

use super::resources::ResourceType;

// ── Upgrade categories ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeCategory {
    /// Adds to the amount mined per tap.
    ClickBoost,
    /// Adds to the idle production per second.
    AutoMine,
}

// ── Static catalogue ────────────────────────────────────────────────

pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub effect_per_level: f64,
    pub category: UpgradeCategory,
    pub cost_resource: ResourceType,
}

/// Returns the full catalogue of upgrades.
pub fn all_upgrades() -> &'static [UpgradeDef] {
    use ResourceType::*;
    use UpgradeCategory::*;

    static UPGRADES: &[UpgradeDef] = &[
        UpgradeDef {
            id: "click_1",
            name: "Sharpened Pickaxe",
            description: "Increases crystals gained per click.",
            base_cost: 15.0,
            cost_multiplier: 1.2,
            effect_per_level: 1.0,
            category: ClickBoost,
            cost_resource: Quartz,
        },
        UpgradeDef {
            id: "auto_1",
            name: "Crystal Golem",
            description: "A friendly construct that mines for you.",
            base_cost: 100.0,
            cost_multiplier: 1.15,
            effect_per_level: 1.0,
            category: AutoMine,
            cost_resource: Quartz,
        },
        UpgradeDef {
            id: "auto_2",
            name: "Arcane Conduit",
            description: "Extracts energy from the ley lines.",
            base_cost: 500.0,
            cost_multiplier: 1.18,
            effect_per_level: 5.0,
            category: AutoMine,
            cost_resource: Amethyst,
        },
        UpgradeDef {
            id: "auto_3",
            name: "Emerald Refinery",
            description: "Highly efficient processing plant.",
            base_cost: 2500.0,
            cost_multiplier: 1.25,
            effect_per_level: 25.0,
            category: AutoMine,
            cost_resource: Emerald,
        },
    ];

    UPGRADES
}

/// `floor(base_cost * cost_multiplier^level)`.
pub fn cost_at_level(base_cost: f64, cost_multiplier: f64, level: u32) -> f64 {
    (base_cost * cost_multiplier.powf(level as f64)).floor()
}

// ── Owned upgrade with its current level ────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub level: u32,
    pub effect_per_level: f64,
    pub category: UpgradeCategory,
    pub cost_resource: ResourceType,
}

impl Upgrade {
    pub fn from_def(def: &UpgradeDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            base_cost: def.base_cost,
            cost_multiplier: def.cost_multiplier,
            level: 0,
            effect_per_level: def.effect_per_level,
            category: def.category,
            cost_resource: def.cost_resource,
        }
    }

    /// Price of the next level.
    pub fn next_cost(&self) -> f64 {
        cost_at_level(self.base_cost, self.cost_multiplier, self.level)
    }

    /// Total effect contributed at the current level.
    pub fn contribution(&self) -> f64 {
        self.level as f64 * self.effect_per_level
    }
}

// ── Upgrade book ────────────────────────────────────────────────────

/// Every upgrade the player can buy, in catalogue order. Entries are never
/// added or removed after construction; only their levels change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeBook {
    upgrades: Vec<Upgrade>,
}

impl UpgradeBook {
    pub fn new(upgrades: Vec<Upgrade>) -> Self {
        Self { upgrades }
    }

    /// The book built from [`all_upgrades`], every level at zero.
    pub fn from_catalogue() -> Self {
        Self::new(all_upgrades().iter().map(Upgrade::from_def).collect())
    }

    pub fn get(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Upgrade> {
        self.upgrades.iter_mut().find(|u| u.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter()
    }

    pub fn in_category(&self, category: UpgradeCategory) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter().filter(move |u| u.category == category)
    }

    /// Number of upgrades bought at least once.
    pub fn leveled_count(&self) -> usize {
        self.upgrades.iter().filter(|u| u.level > 0).count()
    }
}

impl Default for UpgradeBook {
    fn default() -> Self {
        Self::from_catalogue()
    }
}
