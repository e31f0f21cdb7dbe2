use serde::Serialize;

use crate::trial::{Outcome, TrialResult};

/// Running tally for one session.
///
/// Reaction-time sums cover every responded trial, correct or not. The
/// congruent/incongruent sums cover correct responses only and feed the
/// Stroop effect estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub correct: u32,
    pub wrong: u32,
    pub too_slow: u32,
    pub reaction_time_sum_ms: f64,
    pub reaction_time_count: u32,
    pub current_trial: usize,
    pub total_trials: usize,

    congruent_rt_sum_ms: f64,
    congruent_rt_count: u32,
    incongruent_rt_sum_ms: f64,
    incongruent_rt_count: u32,
}

impl SessionStats {
    pub fn new(total_trials: usize) -> Self {
        Self {
            total_trials,
            ..Self::default()
        }
    }

    /// Folds one concluded trial into the tally.
    pub fn record(&mut self, result: &TrialResult) {
        match result.outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Wrong => self.wrong += 1,
            Outcome::TooSlow => self.too_slow += 1,
        }

        let Some(rt) = result.reaction_time_ms else {
            return;
        };
        self.reaction_time_sum_ms += rt;
        self.reaction_time_count += 1;

        if result.outcome.is_correct() {
            if result.spec.is_congruent() {
                self.congruent_rt_sum_ms += rt;
                self.congruent_rt_count += 1;
            } else {
                self.incongruent_rt_sum_ms += rt;
                self.incongruent_rt_count += 1;
            }
        }
    }

    pub fn count(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Correct => self.correct,
            Outcome::Wrong => self.wrong,
            Outcome::TooSlow => self.too_slow,
        }
    }

    pub fn score(&self) -> u32 {
        self.correct
    }

    /// Number of concluded trials
    pub fn completed(&self) -> u32 {
        self.correct + self.wrong + self.too_slow
    }

    pub fn accuracy(&self) -> Option<f64> {
        match self.completed() {
            0 => None,
            n => Some(self.correct as f64 / n as f64),
        }
    }

    pub fn mean_reaction_time_ms(&self) -> Option<f64> {
        mean(self.reaction_time_sum_ms, self.reaction_time_count)
    }

    pub fn mean_correct_reaction_time_ms(&self) -> Option<f64> {
        mean(
            self.congruent_rt_sum_ms + self.incongruent_rt_sum_ms,
            self.congruent_rt_count + self.incongruent_rt_count,
        )
    }

    pub fn mean_congruent_reaction_time_ms(&self) -> Option<f64> {
        mean(self.congruent_rt_sum_ms, self.congruent_rt_count)
    }

    pub fn mean_incongruent_reaction_time_ms(&self) -> Option<f64> {
        mean(self.incongruent_rt_sum_ms, self.incongruent_rt_count)
    }

    /// Incongruent minus congruent mean correct RT.
    pub fn stroop_effect_ms(&self) -> Option<f64> {
        Some(self.mean_incongruent_reaction_time_ms()? - self.mean_congruent_reaction_time_ms()?)
    }
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}
