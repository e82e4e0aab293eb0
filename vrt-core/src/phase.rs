use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phases of a reaction-time experiment.
///
/// `NotStarted -> AwaitingDelay -> StimulusActive -> (AwaitingDelay | Ended)`.
/// `Aborted` is only reached when an internal invariant breaks (see
/// [`crate::ExperimentError::EmptyDeck`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    AwaitingDelay,
    StimulusActive,
    Ended,
    Aborted,
}

impl Phase {
    /// Only a visible stimulus turns a user signal into a sample.
    pub fn accepts_response(&self) -> bool {
        matches!(self, Phase::StimulusActive)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Phase::AwaitingDelay | Phase::StimulusActive)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Ended | Phase::Aborted)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not started",
            Phase::AwaitingDelay => "awaiting delay",
            Phase::StimulusActive => "stimulus active",
            Phase::Ended => "ended",
            Phase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
