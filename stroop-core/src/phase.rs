use serde::Serialize;

/// Trial runner state as seen by the host after each frame.
///
/// `Responded` and `TimedOut` are edge states: `advance` returns one of them
/// on the frame a trial concludes, while the runner itself is already in
/// `Feedback`.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum RunnerState {
    #[default]
    Fixation,
    StimulusWait,
    Responded,
    TimedOut,
    Feedback,
    SessionDone,
}

impl RunnerState {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::StimulusWait)
    }

    /// True on the frame a trial concludes.
    pub fn is_conclusion(&self) -> bool {
        matches!(self, Self::Responded | Self::TimedOut)
    }

    pub fn shows_feedback(&self) -> bool {
        matches!(self, Self::Responded | Self::TimedOut | Self::Feedback)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::SessionDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stimulus_wait_accepts_input() {
        use RunnerState::*;
        for state in [Fixation, Responded, TimedOut, Feedback, SessionDone] {
            assert!(!state.allows_input(), "{state:?} must ignore input");
        }
        assert!(StimulusWait.allows_input());
    }

    #[test]
    fn conclusion_states_render_as_feedback() {
        assert!(RunnerState::Responded.is_conclusion());
        assert!(RunnerState::TimedOut.shows_feedback());
        assert!(!RunnerState::Feedback.is_conclusion());
        assert!(RunnerState::Feedback.shows_feedback());
    }
}
