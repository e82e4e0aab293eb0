use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vrt_core::{Condition, ExperimentError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub max_trials: usize,
    /// How many trials of each condition the deck holds. Totals `max_trials`.
    pub condition_counts: BTreeMap<Condition, usize>,
    /// Inclusive bounds of the random pre-stimulus delay.
    pub delay_range_ms: (u64, u64),
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            max_trials: 10,
            condition_counts: Condition::ALL.iter().map(|&c| (c, 5)).collect(),
            delay_range_ms: (2_000, 5_000),
        }
    }
}

impl ExperimentConfig {
    pub fn with_delay_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.delay_range_ms = (min_ms, max_ms);
        self
    }

    /// Number of trials of `condition` the deck is built with.
    pub fn expected_count(&self, condition: Condition) -> usize {
        self.condition_counts.get(&condition).copied().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.max_trials == 0 {
            return Err(ExperimentError::InvalidConfig(
                "max_trials must be > 0".to_string(),
            ));
        }
        let total: usize = self.condition_counts.values().sum();
        if total != self.max_trials {
            return Err(ExperimentError::InvalidConfig(format!(
                "condition counts sum to {total}, expected max_trials = {}",
                self.max_trials
            )));
        }
        let (min, max) = self.delay_range_ms;
        if min > max {
            return Err(ExperimentError::InvalidConfig(format!(
                "delay range is inverted: {min}..={max} ms"
            )));
        }
        Ok(())
    }
}
