use crate::{Condition, Phase};

/// Receives state notifications from the experiment controller.
///
/// Implementations decide how (and whether) to show anything; the controller
/// never depends on a rendering mechanism.
pub trait Presentation {
    /// Called on every entry into `AwaitingDelay`, `StimulusActive` (with the drawn
    /// condition), `Ended` and `Aborted`.
    fn on_phase_enter(&mut self, phase: Phase, condition: Option<Condition>);

    /// Latest captured latency, for a live readout.
    fn on_reaction(&mut self, _latency_ms: u64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseNotification {
    pub phase: Phase,
    pub condition: Option<Condition>,
}

/// Presentation that only records what it was told. Used for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct PhaseLog {
    pub notifications: Vec<PhaseNotification>,
    pub reactions: Vec<u64>,
}

impl PhaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&PhaseNotification> {
        self.notifications.last()
    }

    /// Conditions shown, in presentation order.
    pub fn shown_conditions(&self) -> Vec<Condition> {
        self.notifications
            .iter()
            .filter(|n| n.phase == Phase::StimulusActive)
            .filter_map(|n| n.condition)
            .collect()
    }
}

impl Presentation for PhaseLog {
    fn on_phase_enter(&mut self, phase: Phase, condition: Option<Condition>) {
        self.notifications.push(PhaseNotification { phase, condition });
    }

    fn on_reaction(&mut self, latency_ms: u64) {
        self.reactions.push(latency_ms);
    }
}
