//! Lexicographic objective.
//!
//! Three goals in strict priority, folded into one scalar to minimize:
//!
//! 1. **Makespan**: latest global end slot.
//! 2. **Run penalty**: consecutive pairs plus three times consecutive
//!    triples, summed over participants.
//! 3. **Rest headroom**: the smallest start-to-start distance between two
//!    matches of the same participant, maximized.
//!
//! `scalar = makespan * W1 + penalty * W2 - min_gap` with `W1 = horizon + 1`
//! (one slot of makespan outweighs any gap trade) and `W2 = match_slots`.

use serde::{Deserialize, Serialize};

/// Weight applied to a triple relative to a pair.
pub const TRIPLE_WEIGHT: i64 = 3;

/// Tier weights of the scalar objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    /// W1.
    pub makespan: i64,
    /// W2.
    pub penalty: i64,
}

impl ObjectiveWeights {
    /// Weights for a grid of `horizon` slots and matches of `match_slots`.
    pub fn for_grid(horizon: usize, match_slots: usize) -> Self {
        Self {
            makespan: horizon as i64 + 1,
            penalty: match_slots as i64,
        }
    }
}

/// The three tiers of a (partial) solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectiveValue {
    pub makespan: usize,
    pub penalty: i64,
    pub min_gap: usize,
}

impl ObjectiveValue {
    /// Folds the tiers into one scalar.
    pub fn scalar(&self, weights: ObjectiveWeights) -> i64 {
        self.makespan as i64 * weights.makespan + self.penalty * weights.penalty
            - self.min_gap as i64
    }
}

/// Two starts closer than `threshold` leave no room for a match between them.
#[inline]
pub fn consecutive(a: usize, b: usize, threshold: usize) -> bool {
    a.abs_diff(b) < threshold
}

/// Number of unordered consecutive pairs among one participant's starts.
pub fn pair_count(starts: &[usize], threshold: usize) -> usize {
    let mut count = 0;
    for (i, &a) in starts.iter().enumerate() {
        count += starts[i + 1..]
            .iter()
            .filter(|&&b| consecutive(a, b, threshold))
            .count();
    }
    count
}

/// Number of time-ordered triples `a < b < c` where both `(a, b)` and
/// `(b, c)` are consecutive.
pub fn triple_count(starts: &[usize], threshold: usize) -> usize {
    if starts.len() < 3 {
        return 0;
    }
    let mut sorted = starts.to_vec();
    sorted.sort_unstable();

    let mut count = 0;
    for (j, &mid) in sorted.iter().enumerate() {
        let before = sorted[..j]
            .iter()
            .filter(|&&a| consecutive(a, mid, threshold))
            .count();
        let after = sorted[j + 1..]
            .iter()
            .filter(|&&c| consecutive(mid, c, threshold))
            .count();
        count += before * after;
    }
    count
}

/// Pair penalty plus weighted triple penalty for one participant.
pub fn run_penalty(starts: &[usize], threshold: usize) -> i64 {
    pair_count(starts, threshold) as i64 + TRIPLE_WEIGHT * triple_count(starts, threshold) as i64
}

/// Smallest start-to-start distance, `None` with fewer than two starts.
pub fn min_gap(starts: &[usize]) -> Option<usize> {
    let mut sorted = starts.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).map(|w| w[1] - w[0]).min()
}

/// Evaluates a complete solution from per-participant global starts.
pub fn evaluate(participant_starts: &[Vec<usize>], makespan: usize, threshold: usize) -> ObjectiveValue {
    let penalty = participant_starts
        .iter()
        .map(|s| run_penalty(s, threshold))
        .sum();
    let min_gap = participant_starts
        .iter()
        .filter_map(|s| min_gap(s))
        .min()
        .unwrap_or(0);
    ObjectiveValue {
        makespan,
        penalty,
        min_gap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 30 min matches + 15 min rest on 5 min slots: threshold 2 * (6 + 3).
    const THRESHOLD: usize = 18;

    #[test]
    fn test_pairs() {
        assert_eq!(pair_count(&[0, 9], THRESHOLD), 1);
        assert_eq!(pair_count(&[0, 18], THRESHOLD), 0);
        assert_eq!(pair_count(&[0, 9, 18], THRESHOLD), 2);
        assert_eq!(pair_count(&[], THRESHOLD), 0);
    }

    #[test]
    fn test_triples_follow_time_order() {
        assert_eq!(triple_count(&[0, 9, 18], THRESHOLD), 1);
        // Input order does not matter, only the time order.
        assert_eq!(triple_count(&[18, 0, 9], THRESHOLD), 1);
        assert_eq!(triple_count(&[0, 9, 27], THRESHOLD), 0);
        assert_eq!(triple_count(&[0, 9], THRESHOLD), 0);
    }

    #[test]
    fn test_run_penalty_weights_triples() {
        // Two pairs + one triple.
        assert_eq!(run_penalty(&[0, 9, 18], THRESHOLD), 2 + TRIPLE_WEIGHT);
        // Two isolated pairs, no triple.
        assert_eq!(run_penalty(&[0, 9, 30, 39], THRESHOLD), 2);
    }

    #[test]
    fn test_min_gap() {
        assert_eq!(min_gap(&[40, 0, 18]), Some(18));
        assert_eq!(min_gap(&[5]), None);
    }

    #[test]
    fn test_evaluate_and_scalar() {
        let starts = vec![vec![0, 9, 18], vec![0, 27], vec![]];
        let value = evaluate(&starts, 51, THRESHOLD);
        assert_eq!(value.makespan, 51);
        assert_eq!(value.penalty, 5);
        assert_eq!(value.min_gap, 9);

        let weights = ObjectiveWeights::for_grid(144, 6);
        assert_eq!(weights.makespan, 145);
        assert_eq!(value.scalar(weights), 51 * 145 + 5 * 6 - 9);
    }

    #[test]
    fn test_makespan_dominates_gap() {
        let weights = ObjectiveWeights::for_grid(144, 6);
        let shorter = ObjectiveValue { makespan: 50, penalty: 0, min_gap: 0 };
        let longer = ObjectiveValue { makespan: 51, penalty: 0, min_gap: 144 };
        assert!(shorter.scalar(weights) < longer.scalar(weights));
    }
}
