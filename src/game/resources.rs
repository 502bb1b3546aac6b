use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

// ── Resource types ──────────────────────────────────────────────────

/// The five crystal kinds. Declaration order is the display order and the
/// usual unlock order, but nothing in the simulation depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Quartz,
    Amethyst,
    Emerald,
    Ruby,
    Celestite,
}

impl ResourceType {
    pub const COUNT: usize = 5;

    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::Quartz,
        ResourceType::Amethyst,
        ResourceType::Emerald,
        ResourceType::Ruby,
        ResourceType::Celestite,
    ];

    fn index(self) -> usize {
        match self {
            ResourceType::Quartz => 0,
            ResourceType::Amethyst => 1,
            ResourceType::Emerald => 2,
            ResourceType::Ruby => 3,
            ResourceType::Celestite => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceType::Quartz => "Quartz",
            ResourceType::Amethyst => "Amethyst",
            ResourceType::Emerald => "Emerald",
            ResourceType::Ruby => "Ruby",
            ResourceType::Celestite => "Celestite",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Per-resource amounts ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Spendable amount.
    pub current: f64,
    /// Everything ever produced. Spending never lowers it.
    pub lifetime: f64,
}

// ── Ledger ──────────────────────────────────────────────────────────

/// Current and lifetime amounts for every resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    entries: [ResourceState; ResourceType::COUNT],
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: ResourceType) -> ResourceState {
        self.entries[resource.index()]
    }

    /// Adds `amount` to both the current and the lifetime total. Totals
    /// saturate at `f64::MAX` rather than overflowing to infinity.
    pub fn credit(&mut self, resource: ResourceType, amount: f64) -> Result<(), GameError> {
        if !(amount >= 0.0) || !amount.is_finite() {
            return Err(GameError::NegativeAmount(amount));
        }
        let entry = &mut self.entries[resource.index()];
        entry.current = (entry.current + amount).min(f64::MAX);
        entry.lifetime = (entry.lifetime + amount).min(f64::MAX);
        Ok(())
    }

    /// Removes `amount` from the current total. Lifetime is untouched.
    pub fn debit(&mut self, resource: ResourceType, amount: f64) -> Result<(), GameError> {
        if !(amount >= 0.0) || !amount.is_finite() {
            return Err(GameError::NegativeAmount(amount));
        }
        let entry = &mut self.entries[resource.index()];
        if amount > entry.current {
            return Err(GameError::InsufficientFunds {
                resource,
                needed: amount,
                available: entry.current,
            });
        }
        entry.current -= amount;
        Ok(())
    }

    /// Sum of the current amounts across every resource type.
    pub fn total_current(&self) -> f64 {
        self.entries.iter().map(|e| e.current).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, ResourceState)> + '_ {
        ResourceType::ALL.iter().map(move |&r| (r, self.get(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn huge_credits_saturate_instead_of_overflowing() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Quartz, f64::MAX).unwrap();
        ledger.credit(ResourceType::Quartz, f64::MAX).unwrap();
        let quartz = ledger.get(ResourceType::Quartz);
        assert_eq!(quartz.current, f64::MAX);
        assert_eq!(quartz.lifetime, f64::MAX);
        assert!(ledger.debit(ResourceType::Quartz, 15.0).is_ok());
    }

    #[test]
    fn credit_raises_current_and_lifetime() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Ruby, 12.5).unwrap();
        let ruby = ledger.get(ResourceType::Ruby);
        assert_eq!(ruby.current, 12.5);
        assert_eq!(ruby.lifetime, 12.5);
        assert_eq!(ledger.get(ResourceType::Quartz), ResourceState::default());
    }

    #[test]
    fn credit_rejects_negative_and_nan() {
        let mut ledger = ResourceLedger::new();
        assert_eq!(
            ledger.credit(ResourceType::Quartz, -1.0),
            Err(GameError::NegativeAmount(-1.0))
        );
        assert!(ledger.credit(ResourceType::Quartz, f64::NAN).is_err());
        assert_eq!(ledger.get(ResourceType::Quartz), ResourceState::default());
    }

    #[test]
    fn debit_keeps_lifetime() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Quartz, 40.0).unwrap();
        ledger.debit(ResourceType::Quartz, 15.0).unwrap();
        let quartz = ledger.get(ResourceType::Quartz);
        assert_eq!(quartz.current, 25.0);
        assert_eq!(quartz.lifetime, 40.0);
    }

    #[test]
    fn debit_beyond_current_is_insufficient_funds() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Emerald, 3.0).unwrap();
        let err = ledger.debit(ResourceType::Emerald, 3.5).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds {
                resource: ResourceType::Emerald,
                ..
            }
        ));
        assert_eq!(ledger.get(ResourceType::Emerald).current, 3.0);
    }

    #[test]
    fn total_current_sums_all_types() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Quartz, 1.0).unwrap();
        ledger.credit(ResourceType::Amethyst, 2.0).unwrap();
        ledger.credit(ResourceType::Celestite, 4.0).unwrap();
        ledger.debit(ResourceType::Amethyst, 1.5).unwrap();
        assert!((ledger.total_current() - 5.5).abs() < 1e-9);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Credit(usize, f64),
        Debit(usize, f64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..ResourceType::COUNT, 0.0f64..1_000.0).prop_map(|(r, a)| Op::Credit(r, a)),
            (0usize..ResourceType::COUNT, 0.0f64..1_000.0).prop_map(|(r, a)| Op::Debit(r, a)),
        ]
    }

    proptest! {
        #[test]
        fn lifetime_never_decreases(ops in prop::collection::vec(op(), 1..64)) {
            let mut ledger = ResourceLedger::new();
            for op in ops {
                let before = ledger.clone();
                match op {
                    Op::Credit(r, a) => { let _ = ledger.credit(ResourceType::ALL[r], a); }
                    Op::Debit(r, a) => { let _ = ledger.debit(ResourceType::ALL[r], a); }
                }
                for r in ResourceType::ALL {
                    prop_assert!(ledger.get(r).lifetime >= before.get(r).lifetime);
                    prop_assert!(ledger.get(r).current >= 0.0);
                }
            }
        }
    }
}
