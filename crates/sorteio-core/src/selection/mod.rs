//! Uniform winner selection.
//!
//! The [`WinnerSelector`] trait abstracts the single probabilistic choice
//! the engine makes: picking one index uniformly from a non-empty candidate
//! set. The production implementation is an entropy-seeded [`UniformSelector`];
//! a fixed-seed constructor exists so tests can replay a draw
//! deterministically.
//!
//! Selection is uniform but not verifiably fair: there is no seed
//! commitment or randomness proof, matching the semantics of the system
//! this engine serves.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors that can occur during winner selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SelectionError {
    /// The candidate set was empty.
    #[error("cannot select a winner from an empty candidate set")]
    EmptyCandidates,
}

/// Picks one candidate uniformly at random from a non-empty set.
///
/// Implementations must give every index in `0..candidates` equal selection
/// probability at the time of the call; no lead attribute may weight the
/// choice.
pub trait WinnerSelector: Send {
    /// Picks an index in `0..candidates`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyCandidates`] when `candidates` is zero.
    fn pick(&mut self, candidates: usize) -> Result<usize, SelectionError>;
}

/// The default selector, backed by a [`StdRng`].
#[derive(Debug)]
pub struct UniformSelector {
    rng: StdRng,
}

impl UniformSelector {
    /// Creates a selector seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a selector with a fixed seed for deterministic replay.
    ///
    /// Same seed and same candidate counts reproduce the same picks.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WinnerSelector for UniformSelector {
    fn pick(&mut self, candidates: usize) -> Result<usize, SelectionError> {
        if candidates == 0 {
            return Err(SelectionError::EmptyCandidates);
        }
        Ok(self.rng.gen_range(0..candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_candidate_set_is_rejected() {
        let mut selector = UniformSelector::from_seed(7);
        assert_eq!(selector.pick(0), Err(SelectionError::EmptyCandidates));
    }

    #[test]
    fn test_pick_is_in_bounds() {
        let mut selector = UniformSelector::from_entropy();
        for len in 1..50 {
            let index = selector.pick(len).unwrap();
            assert!(index < len);
        }
    }

    #[test]
    fn test_single_candidate_always_picked() {
        let mut selector = UniformSelector::from_entropy();
        for _ in 0..100 {
            assert_eq!(selector.pick(1).unwrap(), 0);
        }
    }

    #[test]
    fn test_same_seed_replays_same_sequence() {
        let mut a = UniformSelector::from_seed(42);
        let mut b = UniformSelector::from_seed(42);
        for len in [3, 7, 2, 11, 5] {
            assert_eq!(a.pick(len).unwrap(), b.pick(len).unwrap());
        }
    }

    #[test]
    fn test_every_index_is_reachable() {
        // With 4 candidates and 4000 picks, a uniform selector misses an
        // index with probability ~(3/4)^4000; a miss means the selector is
        // not sampling the whole range.
        let mut selector = UniformSelector::from_seed(1);
        let mut counts = [0_u32; 4];
        for _ in 0..4000 {
            counts[selector.pick(4).unwrap()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0), "counts: {counts:?}");
    }
}
