use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigLoadError, InvalidConfig};

/// Knobs for one Stroop session. Every field may be omitted from the TOML
/// file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub trial_count: usize,
    pub stimulus_duration_ms: f64,
    pub fixation_duration_ms: f64,
    pub feedback_duration_ms: f64,
    pub congruency_ratio: f64,
    pub show_distractor: bool,
    /// Fixed seed for a reproducible trial order.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: 40,
            stimulus_duration_ms: 1200.0,
            fixation_duration_ms: 500.0,
            feedback_duration_ms: 600.0,
            congruency_ratio: 0.5,
            show_distractor: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Checks every constraint, reporting the first one violated.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        validate_sequence_params(self.trial_count, self.congruency_ratio)?;
        if !is_positive_duration(self.stimulus_duration_ms) {
            return Err(InvalidConfig::StimulusDuration);
        }
        if !is_positive_duration(self.fixation_duration_ms) {
            return Err(InvalidConfig::FixationDuration);
        }
        if !is_positive_duration(self.feedback_duration_ms) {
            return Err(InvalidConfig::FeedbackDuration);
        }
        Ok(())
    }

    /// Default location: `<config_dir>/stroop/config.toml`.
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("stroop").join("config.toml")
    }

    /// Parses a TOML document. Call `validate` before use.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields `SessionConfig::default()`; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    debug!(path = %p.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigLoadError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}

fn is_positive_duration(ms: f64) -> bool {
    ms.is_finite() && ms > 0.0
}

pub(crate) fn validate_sequence_params(n: usize, ratio: f64) -> Result<(), InvalidConfig> {
    if n < 1 {
        return Err(InvalidConfig::TrialCount);
    }
    if !(0.0..=1.0).contains(&ratio) {
        return Err(InvalidConfig::CongruencyRatio(ratio));
    }
    Ok(())
}
