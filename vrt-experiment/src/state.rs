use crate::config::ExperimentConfig;
use crate::deck::TrialDeck;
use crate::export::{ExportBundle, ResultTable};
use crate::stats::SummaryStatistics;
use rand::Rng;
use tracing::{debug, error, info};
use vrt_core::{Condition, ExperimentError, InputSignal, Phase, Presentation, TrialSample};
use vrt_timing::{Deadline, OneShotTimer, Timer};

/// Result of the start / download control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    Started,
    /// Pressed while a run is in progress (or after an abort).
    Ignored,
    Export(ExportBundle),
}

/// Result of feeding one [`InputSignal`] into the experiment.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Ignored,
    Captured(TrialSample),
    Control(ControlAction),
}

#[derive(Debug, Clone, Copy)]
struct ActiveStimulus {
    condition: Condition,
    shown_at_ms: u64,
}

/// Trial lifecycle controller.
///
/// All mutation goes through `start`, `update`, `respond` and `activate_control`.
/// The host polls `update` (it fires the pending delay timer once due) and routes
/// user input; everything else is reported through the [`Presentation`].
pub struct ExperimentStateMachine<T, R, P>
where
    T: Timer,
    R: Rng,
    P: Presentation,
{
    phase: Phase,
    timer: T,
    rng: R,
    presenter: P,
    config: ExperimentConfig,
    deck: TrialDeck,
    samples: Vec<TrialSample>,
    active: Option<ActiveStimulus>,
    delay: OneShotTimer,
}

impl<T, R, P> ExperimentStateMachine<T, R, P>
where
    T: Timer,
    R: Rng,
    P: Presentation,
{
    pub fn new(
        config: ExperimentConfig,
        timer: T,
        mut rng: R,
        presenter: P,
    ) -> Result<Self, ExperimentError> {
        config.validate()?;
        let deck = TrialDeck::create(&config.condition_counts, &mut rng);
        Ok(Self {
            phase: Phase::NotStarted,
            timer,
            rng,
            presenter,
            samples: Vec::with_capacity(config.max_trials),
            config,
            deck,
            active: None,
            delay: OneShotTimer::new(),
        })
    }

    /// Begins the first trial. Returns `false` if the experiment was already started.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::NotStarted {
            debug!(phase = %self.phase, "start ignored");
            return false;
        }
        info!("Experiment started");
        self.schedule_stimulus();
        true
    }

    /// Fires the pending delay timer if it is due. Returns `true` when a stimulus was shown.
    pub fn update(&mut self) -> Result<bool, ExperimentError> {
        if self.phase != Phase::AwaitingDelay {
            return Ok(false);
        }
        match self.delay.poll(self.timer.now_ms()) {
            Some(_) => self.show_stimulus().map(|_| true),
            None => Ok(false),
        }
    }

    /// The user signal. Captures a reaction only while a stimulus is visible;
    /// anything earlier (false starts) or later is a no-op.
    pub fn respond(&mut self) -> Option<TrialSample> {
        if !self.phase.accepts_response() {
            debug!(phase = %self.phase, "response ignored");
            return None;
        }
        let active = self.active.take()?;
        let reacted_at = self.timer.now_ms();
        let latency = reacted_at.saturating_sub(active.shown_at_ms);

        let sample = TrialSample {
            trial_index: self.samples.len() + 1,
            condition: active.condition,
            reaction_latency_ms: latency,
        };
        self.samples.push(sample);
        info!(
            trial = sample.trial_index,
            direction = %sample.condition,
            reacted_at,
            latency_ms = latency,
            "User reaction captured"
        );
        self.presenter.on_reaction(latency);

        self.advance_trial();
        Some(sample)
    }

    /// The start / download control: starts a fresh experiment, is ignored while
    /// one is running, and produces an export once it has ended.
    pub fn activate_control(&mut self) -> Result<ControlAction, ExperimentError> {
        match self.phase {
            Phase::NotStarted => {
                self.start();
                Ok(ControlAction::Started)
            }
            Phase::Ended => self.export().map(ControlAction::Export),
            _ => {
                debug!(phase = %self.phase, "control ignored");
                Ok(ControlAction::Ignored)
            }
        }
    }

    pub fn handle_input(&mut self, signal: InputSignal) -> Result<InputOutcome, ExperimentError> {
        match signal {
            InputSignal::Respond => Ok(self
                .respond()
                .map_or(InputOutcome::Ignored, InputOutcome::Captured)),
            InputSignal::Control => self.activate_control().map(InputOutcome::Control),
        }
    }

    /// Dataset and summary for the finished run. Each call draws a new participant id.
    pub fn export(&mut self) -> Result<ExportBundle, ExperimentError> {
        let statistics = self.statistics()?;
        let pid = self.rng.random_range(100_000..=999_999);
        Ok(ExportBundle {
            table: ResultTable::from_samples(pid, &self.samples),
            statistics,
        })
    }

    pub fn statistics(&self) -> Result<SummaryStatistics, ExperimentError> {
        SummaryStatistics::compute(&self.samples, &self.config.condition_counts)
    }

    fn schedule_stimulus(&mut self) {
        let (min, max) = self.config.delay_range_ms;
        let delay_ms = self.rng.random_range(min..=max);
        self.delay.schedule(self.timer.now_ms(), delay_ms);
        self.phase = Phase::AwaitingDelay;
        info!(trial = self.samples.len(), delay_ms, "Random delay scheduled");
        self.presenter.on_phase_enter(Phase::AwaitingDelay, None);
    }

    fn show_stimulus(&mut self) -> Result<(), ExperimentError> {
        let condition = match self.deck.pop() {
            Ok(condition) => condition,
            Err(err) => {
                self.abort(&err);
                return Err(err);
            }
        };
        let shown_at_ms = self.timer.now_ms();
        self.active = Some(ActiveStimulus {
            condition,
            shown_at_ms,
        });
        self.phase = Phase::StimulusActive;
        info!(
            trial = self.samples.len(),
            direction = %condition,
            shown_at_ms,
            "Stimulus shown"
        );
        self.presenter.on_phase_enter(Phase::StimulusActive, Some(condition));
        Ok(())
    }

    fn advance_trial(&mut self) {
        if self.samples.len() < self.config.max_trials {
            self.schedule_stimulus();
        } else {
            self.end();
        }
    }

    fn end(&mut self) {
        self.delay.cancel();
        self.phase = Phase::Ended;
        info!(trials = self.samples.len(), "Experiment ended. Await download of results");
        self.presenter.on_phase_enter(Phase::Ended, None);
    }

    fn abort(&mut self, err: &ExperimentError) {
        self.delay.cancel();
        self.active = None;
        self.phase = Phase::Aborted;
        error!(%err, trials = self.samples.len(), "Experiment aborted");
        self.presenter.on_phase_enter(Phase::Aborted, None);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn samples(&self) -> &[TrialSample] {
        &self.samples
    }

    pub fn current_condition(&self) -> Option<Condition> {
        self.active.map(|a| a.condition)
    }

    pub fn stimulus_presented_at_ms(&self) -> Option<u64> {
        self.active.map(|a| a.shown_at_ms)
    }

    /// The armed delay timer, if any. Only set while awaiting the next stimulus.
    pub fn pending_deadline(&self) -> Option<Deadline> {
        self.delay.deadline()
    }

    pub fn remaining_trials(&self) -> usize {
        self.deck.len()
    }

    /// `(completed, total)` trials.
    pub fn trial_progress(&self) -> (usize, usize) {
        (self.samples.len(), self.config.max_trials)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
