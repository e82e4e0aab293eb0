use std::sync::Arc;
use tracing::debug;
use vrt_core::{Condition, Phase, Presentation};
use vrt_experiment::SummaryStatistics;
use winit::window::Window;

/// What the screen should currently show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StimulusView {
    pub phase: Phase,
    pub condition: Option<Condition>,
    /// Latency of the most recent response; cleared when a new run starts.
    pub last_latency_ms: Option<u64>,
    /// Summary lines, filled once results have been exported.
    pub summary: Vec<String>,
}

/// Presentation backed by the experiment window: keeps the view and asks for a redraw on change.
#[derive(Debug, Default)]
pub struct WindowPresenter {
    view: StimulusView,
    window: Option<Arc<Window>>,
}

impl WindowPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, window: Arc<Window>) {
        window.request_redraw();
        self.window = Some(window);
    }

    pub fn view(&self) -> &StimulusView {
        &self.view
    }

    pub fn show_summary(&mut self, statistics: &SummaryStatistics) {
        self.view.summary = statistics.display_lines();
        self.redraw();
    }

    fn redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl Presentation for WindowPresenter {
    fn on_phase_enter(&mut self, phase: Phase, condition: Option<Condition>) {
        debug!(%phase, ?condition, "phase entered");
        if phase == Phase::AwaitingDelay && self.view.phase == Phase::NotStarted {
            self.view.last_latency_ms = None;
        }
        if phase.is_running() {
            self.view.summary.clear();
        }
        self.view.phase = phase;
        self.view.condition = condition;
        self.redraw();
    }

    fn on_reaction(&mut self, latency_ms: u64) {
        self.view.last_latency_ms = Some(latency_ms);
        self.redraw();
    }
}
