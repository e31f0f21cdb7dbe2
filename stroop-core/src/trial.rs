use serde::{Deserialize, Serialize};

use crate::stimulus::{Direction, TrialSpec};

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Correct,
    Wrong,
    TooSlow,
}

impl Outcome {
    /// Classifies a response against the word. The arrow never matters.
    pub fn classify(spec: &TrialSpec, response: Option<Direction>) -> Self {
        match response {
            None => Outcome::TooSlow,
            Some(dir) if dir == spec.target => Outcome::Correct,
            Some(_) => Outcome::Wrong,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Correct => "Correct!",
            Outcome::Wrong => "Wrong!",
            Outcome::TooSlow => "Too Slow!",
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub index: usize,
    pub spec: TrialSpec,
    pub response: Option<Direction>,
    pub reaction_time_ms: Option<f64>,
    pub outcome: Outcome,
}

impl TrialResult {
    pub fn new(
        index: usize,
        spec: TrialSpec,
        response: Option<Direction>,
        reaction_time_ms: Option<f64>,
    ) -> Self {
        Self {
            index,
            spec,
            response,
            reaction_time_ms: response.and(reaction_time_ms),
            outcome: Outcome::classify(&spec, response),
        }
    }
}
