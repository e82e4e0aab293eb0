use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use vrt_core::{Condition, ExperimentError, TrialSample};

/// Summary of a completed run, in milliseconds. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor = count).
    pub standard_deviation: f64,
    pub mean_by_condition: BTreeMap<Condition, f64>,
}

impl SummaryStatistics {
    /// Computes the summary over `samples`.
    ///
    /// Per-condition means divide by the number of trials of that condition the
    /// deck was built with (`expected_counts`), not by how many were observed.
    /// With a complete run the two agree; for a partial log the mean is understated.
    /// Conditions with no expected trials are left out of `mean_by_condition`.
    pub fn compute(
        samples: &[TrialSample],
        expected_counts: &BTreeMap<Condition, usize>,
    ) -> Result<Self, ExperimentError> {
        if samples.is_empty() {
            return Err(ExperimentError::EmptySampleSet);
        }

        let n = samples.len() as f64;
        let latencies = samples.iter().map(|s| s.reaction_latency_ms as f64);
        let mean = latencies.clone().sum::<f64>() / n;
        let variance = latencies.map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let mean_by_condition = Condition::ALL
            .iter()
            .filter_map(|&condition| {
                let divisor = expected_counts.get(&condition).copied().unwrap_or(0);
                if divisor == 0 {
                    return None;
                }
                let sum: u64 = samples
                    .iter()
                    .filter(|s| s.condition == condition)
                    .map(|s| s.reaction_latency_ms)
                    .sum();
                Some((condition, sum as f64 / divisor as f64))
            })
            .collect();

        Ok(Self {
            count: samples.len(),
            mean,
            standard_deviation: variance.sqrt(),
            mean_by_condition,
        })
    }

    pub fn condition_mean(&self, condition: Condition) -> Option<f64> {
        self.mean_by_condition.get(&condition).copied()
    }

    /// One entry per figure, two decimals, for on-screen display.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Count: {}", self.count),
            format!("Mean: {:.2} ms", self.mean),
            format!("SD: {:.2} ms", self.standard_deviation),
        ];
        lines.extend(
            self.mean_by_condition
                .iter()
                .map(|(condition, mean)| format!("{} Mean: {:.2} ms", condition.title(), mean)),
        );
        lines
    }
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_lines().join(" "))
    }
}
