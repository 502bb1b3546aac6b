use super::upgrades::{UpgradeBook, UpgradeCategory};

/// Yield computed from the upgrade levels and the resonance multiplier.
///
/// Nothing is cached: every call reads the levels it is given, so the
/// numbers always reflect the latest purchase or resonance.
pub struct ProductionCalculator<'a> {
    upgrades: &'a UpgradeBook,
    multiplier: f64,
}

impl<'a> ProductionCalculator<'a> {
    pub fn new(upgrades: &'a UpgradeBook, multiplier: f64) -> Self {
        Self {
            upgrades,
            multiplier,
        }
    }

    /// `(1 + Σ click boosts) * multiplier`
    pub fn per_click(&self) -> f64 {
        let bonus: f64 = self
            .upgrades
            .in_category(UpgradeCategory::ClickBoost)
            .map(|u| u.contribution())
            .sum();
        (1.0 + bonus) * self.multiplier
    }

    /// `(Σ auto miners) * multiplier`
    pub fn per_second(&self) -> f64 {
        let base: f64 = self
            .upgrades
            .in_category(UpgradeCategory::AutoMine)
            .map(|u| u.contribution())
            .sum();
        base * self.multiplier
    }
}
