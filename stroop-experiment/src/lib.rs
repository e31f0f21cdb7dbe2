pub mod config;
pub mod error;
pub mod runner;
pub mod sequencer;
mod trial;

pub use config::SessionConfig;
pub use error::{ConfigLoadError, InvalidConfig};
pub use runner::TrialRunner;
pub use sequencer::{congruent_count, generate, generate_with_rng};
