use thiserror::Error;

/// Failure taxonomy shared by the experiment crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExperimentError {
    /// The deck ran out before the experiment collected all of its trials.
    /// This is an invariant violation; the run is aborted rather than guessing a condition.
    #[error("trial deck exhausted before the experiment ended")]
    EmptyDeck,
    #[error("statistics requested over an empty sample set")]
    EmptySampleSet,
    /// Input the experiment does not act on. Non-fatal: callers log it and move on.
    #[error("unrecognized input signal: {0}")]
    UnrecognizedInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl ExperimentError {
    /// Whether the error ends the run (as opposed to being logged and ignored).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExperimentError::UnrecognizedInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unrecognized_input_is_recoverable() {
        assert!(!ExperimentError::UnrecognizedInput("KeyA".into()).is_fatal());
        assert!(ExperimentError::EmptyDeck.is_fatal());
        assert!(ExperimentError::Export("disk full".into()).is_fatal());
    }
}
