use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use stroop_core::{Direction, TrialSpec};
use tracing::debug;

use crate::config::validate_sequence_params;
use crate::error::InvalidConfig;

/// Number of congruent trials in a session of `n`.
///
/// Halves round to even, so `n = 5, ratio = 0.5` yields 2.
pub fn congruent_count(n: usize, ratio: f64) -> usize {
    (n as f64 * ratio).round_ties_even() as usize
}

/// Builds a shuffled, congruency-balanced trial sequence.
///
/// With `seed` the sequence is reproducible; without it the generator is
/// seeded from the OS.
pub fn generate(
    n: usize,
    ratio: f64,
    seed: Option<u64>,
) -> Result<Vec<TrialSpec>, InvalidConfig> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    generate_with_rng(n, ratio, &mut rng)
}

pub fn generate_with_rng<R: Rng>(
    n: usize,
    ratio: f64,
    rng: &mut R,
) -> Result<Vec<TrialSpec>, InvalidConfig> {
    validate_sequence_params(n, ratio)?;

    let n_congruent = congruent_count(n, ratio);
    let mut trials = Vec::with_capacity(n);
    for slot in 0..n {
        let target = random_direction(rng);
        let side = random_direction(rng);
        trials.push(if slot < n_congruent {
            TrialSpec::congruent(target, side)
        } else {
            TrialSpec::incongruent(target, side)
        });
    }
    trials.shuffle(rng);

    debug!(
        n,
        n_congruent,
        n_incongruent = n - n_congruent,
        "trial sequence generated"
    );
    Ok(trials)
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    if rng.random_bool(0.5) {
        Direction::Left
    } else {
        Direction::Right
    }
}
