use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::resources::ResourceType;

/// Decides which resource types are accessible from the lifetime amount of
/// the base resource. Thresholds are data; the policy assumes no ordering
/// between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockPolicy {
    base: ResourceType,
    thresholds: BTreeMap<ResourceType, f64>,
}

impl UnlockPolicy {
    /// Builds a policy. The base resource is always forced to threshold 0.
    /// Types missing from `thresholds` never unlock.
    pub fn new(base: ResourceType, thresholds: BTreeMap<ResourceType, f64>) -> Self {
        let mut thresholds = thresholds;
        thresholds.insert(base, 0.0);
        Self { base, thresholds }
    }

    /// Quartz-based tiers at 0 / 500 / 5 000 / 25 000 / 100 000.
    pub fn reference() -> Self {
        Self::new(ResourceType::Quartz, reference_thresholds())
    }

    pub fn base(&self) -> ResourceType {
        self.base
    }

    pub fn threshold(&self, resource: ResourceType) -> Option<f64> {
        self.thresholds.get(&resource).copied()
    }

    pub fn is_unlocked(&self, resource: ResourceType, lifetime_base: f64) -> bool {
        self.threshold(resource)
            .map_or(false, |threshold| lifetime_base >= threshold)
    }

    pub fn unlocked_types(&self, lifetime_base: f64) -> BTreeSet<ResourceType> {
        self.thresholds
            .iter()
            .filter(|(_, &threshold)| lifetime_base >= threshold)
            .map(|(&resource, _)| resource)
            .collect()
    }
}

impl Default for UnlockPolicy {
    fn default() -> Self {
        Self::reference()
    }
}

pub fn reference_thresholds() -> BTreeMap<ResourceType, f64> {
    BTreeMap::from([
        (ResourceType::Quartz, 0.0),
        (ResourceType::Amethyst, 500.0),
        (ResourceType::Emerald, 5_000.0),
        (ResourceType::Ruby, 25_000.0),
        (ResourceType::Celestite, 100_000.0),
    ])
}
