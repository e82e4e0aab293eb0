use crate::Condition;
use serde::{Deserialize, Serialize};

/// One recorded trial. Samples are appended in trial order and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSample {
    /// 1-based position of the trial within the run.
    pub trial_index: usize,
    pub condition: Condition,
    pub reaction_latency_ms: u64,
}

/// Logical inputs the experiment reacts to, after the host has mapped raw key/click events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSignal {
    /// "User responded": the designated response key.
    Respond,
    /// The start / download control.
    Control,
}
