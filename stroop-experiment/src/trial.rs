use stroop_core::TrialSpec;

use crate::config::SessionConfig;

/// The trial currently being run, with the clock readings that drive its
/// state transitions.
#[derive(Debug, Clone)]
pub(crate) struct Trial {
    pub index: usize,
    pub spec: TrialSpec,
    pub timestamps: TrialTimestamps,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrialDurations {
    pub fixation_ms: f64,
    pub stimulus_ms: f64,
    pub feedback_ms: f64,
}

impl From<&SessionConfig> for TrialDurations {
    fn from(config: &SessionConfig) -> Self {
        Self {
            fixation_ms: config.fixation_duration_ms,
            stimulus_ms: config.stimulus_duration_ms,
            feedback_ms: config.feedback_duration_ms,
        }
    }
}

/// Times in milliseconds on the host's clock. `None` until the phase is
/// reached.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TrialTimestamps {
    pub fixation_start: Option<f64>,
    pub stimulus_onset: Option<f64>,
    pub response: Option<f64>,
    pub feedback_start: Option<f64>,
}

impl Trial {
    pub(crate) fn new(index: usize, spec: TrialSpec) -> Self {
        Self {
            index,
            spec,
            timestamps: TrialTimestamps::default(),
        }
    }

    pub(crate) fn reaction_time_ms(&self) -> Option<f64> {
        Some(elapsed_ms(
            self.timestamps.response?,
            self.timestamps.stimulus_onset?,
        ))
    }
}

/// Time since `since`, clamped at zero if the clock went backwards.
pub(crate) fn elapsed_ms(now: f64, since: f64) -> f64 {
    (now - since).max(0.0)
}
