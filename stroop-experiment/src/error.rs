use std::path::PathBuf;
use thiserror::Error;

/// A session configuration constraint that does not hold.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum InvalidConfig {
    #[error("trial_count must be >= 1")]
    TrialCount,

    #[error("congruency_ratio must be within [0, 1], got {0}")]
    CongruencyRatio(f64),

    #[error("stimulus_duration_ms must be > 0")]
    StimulusDuration,

    #[error("fixation_duration_ms must be > 0")]
    FixationDuration,

    #[error("feedback_duration_ms must be > 0")]
    FeedbackDuration,

    #[error("trial sequence has {actual} trials but trial_count is {expected}")]
    SequenceLength { expected: usize, actual: usize },
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] InvalidConfig),
}
