use serde::{Deserialize, Serialize};

use crate::game::{GameState, HistorySample, ResourceType, UpgradeView};

// ── Core type aliases ──────────────────────────────────────────────

pub type Sequence = u64;

// ── Snapshot (Server → Client) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resource: ResourceType,
    pub current: f64,
    pub lifetime: f64,
    pub unlocked: bool,
    pub unlock_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub level: u32,
    pub effect_per_level: f64,
    pub cost_resource: ResourceType,
    pub next_cost: f64,
    pub affordable: bool,
}

impl From<UpgradeView> for UpgradeSnapshot {
    fn from(view: UpgradeView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            description: view.description,
            category: format!("{:?}", view.category),
            level: view.level,
            effect_per_level: view.effect_per_level,
            cost_resource: view.cost_resource,
            next_cost: view.next_cost,
            affordable: view.affordable,
        }
    }
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshotView {
    pub ticks: u64,
    pub resources: Vec<ResourceSnapshot>,
    pub selected: ResourceType,
    pub per_click: f64,
    pub per_second: f64,
    pub multiplier: f64,
    pub dialogue: String,
    pub last_lore: Option<String>,
    pub resonance_pending: bool,
    pub upgrades: Vec<UpgradeSnapshot>,
    pub history: Vec<HistorySample>,
    /// Most samples `history` will ever hold; the chart's x-axis width.
    pub history_capacity: usize,
}

impl From<&GameState> for GameSnapshotView {
    fn from(state: &GameState) -> Self {
        let resources = state
            .ledger
            .iter()
            .map(|(resource, amounts)| ResourceSnapshot {
                resource,
                current: amounts.current,
                lifetime: amounts.lifetime,
                unlocked: state.is_unlocked(resource),
                unlock_threshold: state.unlocks.threshold(resource),
            })
            .collect();

        Self {
            ticks: state.ticks,
            resources,
            selected: state.selected,
            per_click: state.per_click(),
            per_second: state.per_second(),
            multiplier: state.multiplier,
            dialogue: state.dialogue.clone(),
            last_lore: state.last_lore.clone(),
            resonance_pending: state.resonance_pending,
            upgrades: state
                .upgrade_views()
                .into_iter()
                .map(UpgradeSnapshot::from)
                .collect(),
            history: state.history.to_vec(),
            history_capacity: state.history.capacity(),
        }
    }
}

// ── Client → Server messages ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    Click,
    Purchase { upgrade_id: String },
    SelectResource { resource: ResourceType },
    CastIncantation { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInput {
    pub seq: Sequence,
    pub action: PlayerAction,
}

/// Server-to-client message wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Periodic full snapshot.
    Snapshot(GameSnapshotView),
    /// The action with this sequence number changed nothing.
    ActionRejected { seq: Sequence, reason: String },
    /// An incantation finished; `accepted` is false when it fizzled.
    ResonanceFinished {
        seq: Sequence,
        accepted: bool,
        message: String,
    },
}
