pub mod config;
pub mod deck;
pub mod export;
pub mod state;
pub mod stats;

pub use config::ExperimentConfig;
pub use deck::TrialDeck;
pub use export::{CsvFileSink, ExportBundle, MemorySink, ResultRow, ResultSink, ResultTable};
pub use state::{ControlAction, ExperimentStateMachine, InputOutcome};
pub use stats::SummaryStatistics;
