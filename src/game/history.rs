use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// Milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
    /// Sum of every current resource amount when the sample was taken.
    pub total_value: f64,
}

/// Fixed-capacity series of samples, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    capacity: usize,
    samples: VecDeque<HistorySample>,
}

impl HistorySeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a sample, dropping the oldest ones once the series is full.
    pub fn push(&mut self, sample: HistorySample) {
        if self.capacity == 0 {
            return;
        }
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<HistorySample> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(i: u64) -> HistorySample {
        HistorySample {
            timestamp_ms: i,
            total_value: i as f64,
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut series = HistorySeries::new(3);
        for i in 0..5 {
            series.push(sample(i));
        }
        let stamps: Vec<u64> = series.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
        assert_eq!(series.latest().unwrap().timestamp_ms, 4);
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut series = HistorySeries::new(0);
        series.push(sample(1));
        assert!(series.is_empty());
        assert_eq!(series.capacity(), 0);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..40, pushes in 0u64..200) {
            let mut series = HistorySeries::new(capacity);
            for i in 0..pushes {
                series.push(sample(i));
                prop_assert!(series.len() <= capacity);
            }
            if pushes > 0 {
                prop_assert_eq!(series.latest().unwrap().timestamp_ms, pushes - 1);
                let first = series.iter().next().unwrap().timestamp_ms;
                prop_assert_eq!(first, pushes.saturating_sub(capacity as u64));
            }
        }
    }
}
