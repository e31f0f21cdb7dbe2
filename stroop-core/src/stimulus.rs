use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal direction named by the word, pointed to by the arrow, or
/// chosen by the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Left, Direction::Right];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The word displayed on screen.
    pub fn word(self) -> &'static str {
        match self {
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// One trial's stimulus, fixed before the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    /// Direction named by the word; the correct response.
    pub target: Direction,
    /// Direction the distractor arrow points.
    pub distractor: Direction,
    /// Side of the word the arrow is drawn on.
    pub distractor_side: Direction,
}

impl TrialSpec {
    pub fn congruent(target: Direction, distractor_side: Direction) -> Self {
        Self {
            target,
            distractor: target,
            distractor_side,
        }
    }

    pub fn incongruent(target: Direction, distractor_side: Direction) -> Self {
        Self {
            target,
            distractor: target.opposite(),
            distractor_side,
        }
    }

    pub fn is_congruent(&self) -> bool {
        self.target == self.distractor
    }
}
