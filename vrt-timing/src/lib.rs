pub mod oneshot;
pub mod timer;

pub use oneshot::{Deadline, OneShotTimer, TimerHandle};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
