pub mod condition;
pub mod error;
pub mod phase;
pub mod presentation;
pub mod trial;

pub use condition::Condition;
pub use error::ExperimentError;
pub use phase::Phase;
pub use presentation::{PhaseLog, PhaseNotification, Presentation};
pub use trial::{InputSignal, TrialSample};
