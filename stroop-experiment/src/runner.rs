use stroop_core::{Direction, RunnerState, SessionStats, TrialResult, TrialSpec};
use tracing::{debug, info};

use super::config::SessionConfig;
use super::error::InvalidConfig;
use super::sequencer;
use super::trial::{Trial, TrialDurations, elapsed_ms};

/// Drives one session, one trial at a time, from the host's frame loop.
///
/// The runner never reads a clock: every transition is decided by the
/// `now_ms` the host passes to [`TrialRunner::advance`].
#[derive(Debug, Clone)]
pub struct TrialRunner {
    config: SessionConfig,
    durations: TrialDurations,
    trials: Vec<TrialSpec>,
    current: Trial,
    state: RunnerState,
    stats: SessionStats,
    results: Vec<TrialResult>,
}

impl TrialRunner {
    /// Validates `config` and `trials` and readies the first trial's fixation.
    pub fn new(config: SessionConfig, trials: Vec<TrialSpec>) -> Result<Self, InvalidConfig> {
        config.validate()?;
        let first = match trials.first() {
            Some(spec) if trials.len() == config.trial_count => *spec,
            _ => {
                return Err(InvalidConfig::SequenceLength {
                    expected: config.trial_count,
                    actual: trials.len(),
                });
            }
        };

        info!(
            trials = trials.len(),
            congruent = trials.iter().filter(|t| t.is_congruent()).count(),
            stimulus_ms = config.stimulus_duration_ms,
            fixation_ms = config.fixation_duration_ms,
            "session ready"
        );

        Ok(Self {
            durations: TrialDurations::from(&config),
            stats: SessionStats::new(trials.len()),
            results: Vec::with_capacity(trials.len()),
            current: Trial::new(0, first),
            state: RunnerState::Fixation,
            trials,
            config,
        })
    }

    /// Generates the trial sequence from `config` (honouring `config.seed`).
    pub fn from_config(config: SessionConfig) -> Result<Self, InvalidConfig> {
        config.validate()?;
        let trials =
            sequencer::generate(config.trial_count, config.congruency_ratio, config.seed)?;
        Self::new(config, trials)
    }

    /// Steps the state machine to `now_ms`.
    ///
    /// `input` is the directional control pressed this frame, if any. It only
    /// counts while the stimulus is up; anywhere else it is dropped.
    pub fn advance(&mut self, now_ms: f64, input: Option<Direction>) -> RunnerState {
        match self.state {
            RunnerState::Fixation => {
                let start = *self
                    .current
                    .timestamps
                    .fixation_start
                    .get_or_insert(now_ms);
                if elapsed_ms(now_ms, start) >= self.durations.fixation_ms {
                    self.current.timestamps.stimulus_onset = Some(now_ms);
                    self.state = RunnerState::StimulusWait;
                    debug!(trial = self.current.index, onset_ms = now_ms, "stimulus onset");
                }
            }
            RunnerState::StimulusWait => {
                let onset = self.current.timestamps.stimulus_onset.unwrap_or(now_ms);
                if let Some(direction) = input {
                    return self.conclude(now_ms, Some(direction));
                }
                if elapsed_ms(now_ms, onset) >= self.durations.stimulus_ms {
                    return self.conclude(now_ms, None);
                }
            }
            RunnerState::Responded | RunnerState::TimedOut | RunnerState::Feedback => {
                let start = self.current.timestamps.feedback_start.unwrap_or(now_ms);
                if elapsed_ms(now_ms, start) >= self.durations.feedback_ms {
                    self.next_trial(now_ms);
                }
            }
            RunnerState::SessionDone => {}
        }
        self.state
    }

    fn conclude(&mut self, now_ms: f64, response: Option<Direction>) -> RunnerState {
        self.current.timestamps.response = response.map(|_| now_ms);
        self.current.timestamps.feedback_start = Some(now_ms);
        let reaction_time_ms = self.current.reaction_time_ms();

        let result = TrialResult::new(
            self.current.index,
            self.current.spec,
            response,
            reaction_time_ms,
        );
        debug!(
            trial = result.index,
            target = %result.spec.target,
            distractor = %result.spec.distractor,
            response = ?result.response,
            rt_ms = ?result.reaction_time_ms,
            outcome = ?result.outcome,
            "trial concluded"
        );
        self.stats.record(&result);
        self.results.push(result);
        self.state = RunnerState::Feedback;

        if response.is_some() {
            RunnerState::Responded
        } else {
            RunnerState::TimedOut
        }
    }

    fn next_trial(&mut self, now_ms: f64) {
        let next = self.current.index + 1;
        let Some(spec) = self.trials.get(next).copied() else {
            self.state = RunnerState::SessionDone;
            info!(
                correct = self.stats.correct,
                wrong = self.stats.wrong,
                too_slow = self.stats.too_slow,
                mean_rt_ms = ?self.stats.mean_reaction_time_ms(),
                "session complete"
            );
            return;
        };

        self.current = Trial::new(next, spec);
        self.current.timestamps.fixation_start = Some(now_ms);
        self.stats.current_trial = next;
        self.state = RunnerState::Fixation;
    }

    /// The trial being run, or the last one once the session is done.
    pub fn current_trial(&self) -> &TrialSpec {
        &self.current.spec
    }

    pub fn current_index(&self) -> usize {
        self.current.index
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn last_result(&self) -> Option<&TrialResult> {
        self.results.last()
    }

    pub fn trials(&self) -> &[TrialSpec] {
        &self.trials
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Remaining response window, while the stimulus is up.
    pub fn time_left_ms(&self, now_ms: f64) -> Option<f64> {
        if self.state != RunnerState::StimulusWait {
            return None;
        }
        let onset = self.current.timestamps.stimulus_onset?;
        Some((self.durations.stimulus_ms - elapsed_ms(now_ms, onset)).max(0.0))
    }

    /// (1-based trial number, total) for progress displays.
    pub fn progress(&self) -> (usize, usize) {
        (self.current.index + 1, self.trials.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::Outcome;

    fn config(n: usize) -> SessionConfig {
        SessionConfig {
            trial_count: n,
            stimulus_duration_ms: 2000.0,
            fixation_duration_ms: 500.0,
            feedback_duration_ms: 600.0,
            ..SessionConfig::default()
        }
    }

    fn single(spec: TrialSpec) -> TrialRunner {
        TrialRunner::new(config(1), vec![spec]).unwrap()
    }

    /// Runs fixation from t=0 and returns the stimulus onset time.
    fn to_stimulus(runner: &mut TrialRunner) -> f64 {
        assert_eq!(runner.advance(0.0, None), RunnerState::Fixation);
        assert_eq!(runner.advance(500.0, None), RunnerState::StimulusWait);
        500.0
    }

    #[test]
    fn fixation_waits_full_duration() {
        let mut runner = single(TrialSpec::congruent(Direction::Left, Direction::Left));
        assert_eq!(runner.advance(100.0, None), RunnerState::Fixation);
        assert_eq!(runner.advance(599.9, None), RunnerState::Fixation);
        assert_eq!(runner.advance(600.0, None), RunnerState::StimulusWait);
    }

    #[test]
    fn correct_response_records_reaction_time() {
        let spec = TrialSpec::incongruent(Direction::Right, Direction::Left);
        let mut runner = single(spec);
        let onset = to_stimulus(&mut runner);

        let state = runner.advance(onset + 432.0, Some(Direction::Right));
        assert_eq!(state, RunnerState::Responded);
        assert_eq!(runner.state(), RunnerState::Feedback);

        let result = runner.last_result().unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
        assert_eq!(result.reaction_time_ms, Some(432.0));
        assert_eq!(runner.stats().correct, 1);
    }

    #[test]
    fn mismatched_response_is_wrong() {
        let spec = TrialSpec::congruent(Direction::Left, Direction::Right);
        let mut runner = single(spec);
        let onset = to_stimulus(&mut runner);
        runner.advance(onset + 300.0, Some(Direction::Right));
        assert_eq!(runner.last_result().unwrap().outcome, Outcome::Wrong);
        assert_eq!(runner.stats().wrong, 1);
        assert_eq!(runner.stats().mean_reaction_time_ms(), Some(300.0));
    }

    #[test]
    fn silence_times_out() {
        let mut runner = single(TrialSpec::congruent(Direction::Left, Direction::Left));
        let onset = to_stimulus(&mut runner);
        assert_eq!(runner.advance(onset + 1999.0, None), RunnerState::StimulusWait);
        assert_eq!(runner.advance(onset + 2000.0, None), RunnerState::TimedOut);

        let result = runner.last_result().unwrap();
        assert_eq!(result.outcome, Outcome::TooSlow);
        assert_eq!(result.response, None);
        assert_eq!(result.reaction_time_ms, None);
        assert_eq!(runner.stats().reaction_time_count, 0);
    }

    #[test]
    fn input_outside_stimulus_is_ignored() {
        let mut runner = TrialRunner::new(
            config(2),
            vec![
                TrialSpec::congruent(Direction::Left, Direction::Left),
                TrialSpec::congruent(Direction::Right, Direction::Left),
            ],
        )
        .unwrap();

        // During fixation, and on the frame the stimulus appears.
        assert_eq!(runner.advance(0.0, Some(Direction::Left)), RunnerState::Fixation);
        assert_eq!(
            runner.advance(500.0, Some(Direction::Left)),
            RunnerState::StimulusWait
        );
        assert!(runner.results().is_empty());

        runner.advance(700.0, Some(Direction::Left));
        // Second press in the same trial, during feedback.
        assert_eq!(runner.advance(800.0, Some(Direction::Right)), RunnerState::Feedback);
        assert_eq!(runner.results().len(), 1);
        assert_eq!(runner.stats().correct, 1);
        assert_eq!(runner.stats().wrong, 0);
    }

    #[test]
    fn feedback_leads_to_next_fixation_then_done() {
        let mut runner = TrialRunner::new(
            config(2),
            vec![
                TrialSpec::congruent(Direction::Left, Direction::Left),
                TrialSpec::incongruent(Direction::Right, Direction::Right),
            ],
        )
        .unwrap();
        to_stimulus(&mut runner);
        runner.advance(900.0, Some(Direction::Left));
        assert_eq!(runner.advance(1499.0, None), RunnerState::Feedback);
        assert_eq!(runner.advance(1500.0, None), RunnerState::Fixation);
        assert_eq!(runner.current_index(), 1);
        assert_eq!(runner.current_trial().target, Direction::Right);
        assert_eq!(runner.progress(), (2, 2));

        assert_eq!(runner.advance(2000.0, None), RunnerState::StimulusWait);
        assert_eq!(runner.advance(4000.0, None), RunnerState::TimedOut);
        assert_eq!(runner.advance(4600.0, None), RunnerState::SessionDone);
        assert!(runner.is_done());
        assert_eq!(runner.advance(9000.0, Some(Direction::Left)), RunnerState::SessionDone);
        assert_eq!(runner.stats().completed(), 2);
    }

    #[test]
    fn response_on_deadline_frame_is_honoured() {
        let mut runner = single(TrialSpec::congruent(Direction::Right, Direction::Right));
        let onset = to_stimulus(&mut runner);
        assert_eq!(
            runner.advance(onset + 2000.0, Some(Direction::Right)),
            RunnerState::Responded
        );
        assert_eq!(runner.last_result().unwrap().reaction_time_ms, Some(2000.0));
    }

    #[test]
    fn clock_going_backwards_counts_as_no_time() {
        let mut runner = single(TrialSpec::congruent(Direction::Left, Direction::Left));
        let onset = to_stimulus(&mut runner);
        assert_eq!(runner.advance(onset - 50.0, None), RunnerState::StimulusWait);
        runner.advance(onset - 50.0, Some(Direction::Left));
        assert_eq!(runner.last_result().unwrap().reaction_time_ms, Some(0.0));
    }

    #[test]
    fn time_left_counts_down_during_stimulus_only() {
        let mut runner = single(TrialSpec::congruent(Direction::Left, Direction::Left));
        assert_eq!(runner.time_left_ms(0.0), None);
        let onset = to_stimulus(&mut runner);
        assert_eq!(runner.time_left_ms(onset + 500.0), Some(1500.0));
        assert_eq!(runner.time_left_ms(onset + 5000.0), Some(0.0));
    }

    #[test]
    fn construction_fails_fast() {
        assert_eq!(
            TrialRunner::new(config(2), vec![]).unwrap_err(),
            InvalidConfig::SequenceLength {
                expected: 2,
                actual: 0
            }
        );
        let bad = SessionConfig {
            fixation_duration_ms: 0.0,
            ..config(1)
        };
        assert_eq!(
            TrialRunner::from_config(bad).unwrap_err(),
            InvalidConfig::FixationDuration
        );
    }
}
