pub mod phase;
pub mod stats;
pub mod stimulus;
pub mod trial;

pub use phase::RunnerState;
pub use stats::SessionStats;
pub use stimulus::{Direction, TrialSpec};
pub use trial::{Outcome, TrialResult};
