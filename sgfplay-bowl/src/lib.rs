//! Layouts of captured stones in the bowl lids.
//!
//! A layout is a list of stone centres relative to the lid centre. Physics
//! models are pluggable through [`BowlPhysics`]; [`ScatterBowl`] is the
//! default.

use log::debug;
use std::f64::consts::PI;
use stonerandom::{seed, XorShift32};

/// Diagnostics from a layout computation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvergenceInfo {
    /// Stones added on top of `current_count`
    pub dropped: usize,
    /// Candidate positions evaluated
    pub candidates_tried: usize,
    /// Pairs of stones closer than two radii
    pub overlapping_pairs: usize,
    /// True if no pair overlaps
    pub converged: bool,
}

/// Stone centres in a lid
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BowlLayout {
    pub positions: Vec<(f64, f64)>,
    pub convergence: ConvergenceInfo,
}

impl BowlLayout {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Physics model placing stones in a lid.
///
/// Implementations must be deterministic for a given `seed`.
pub trait BowlPhysics: Send + Sync {
    /// Layout of `target_count` stones. `current_count` is the number of
    /// stones already resting in the lid.
    fn compute_stone_positions(
        &self,
        current_count: usize,
        target_count: usize,
        bowl_radius: f64,
        stone_radius: f64,
        seed: u32,
        is_white_bowl: bool,
    ) -> BowlLayout;
}

/// Best-candidate scatter.
///
/// Stone `k` draws `candidates` uniform points in the lid from its own seed
/// and keeps the one farthest from the stones before it. A stone never
/// depends on the stones after it, so the layout for `n` stones is a prefix
/// of the layout for `n + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScatterBowl {
    pub candidates: u32,
}

impl Default for ScatterBowl {
    fn default() -> Self {
        ScatterBowl { candidates: 12 }
    }
}

impl ScatterBowl {
    pub fn new(candidates: u32) -> Self {
        ScatterBowl {
            candidates: candidates.max(1),
        }
    }

    fn place(
        &self,
        index: usize,
        placed: &[(f64, f64)],
        reach: f64,
        seed_value: u32,
        is_white_bowl: bool,
    ) -> (f64, f64) {
        let mut rng = XorShift32::from_seed(seed(index as i64, is_white_bowl as i64, 0, seed_value));

        let mut best = (0.0, 0.0);
        let mut best_gap = f64::NEG_INFINITY;
        for _ in 0..self.candidates.max(1) {
            // sqrt keeps the density uniform over the disc
            let r = reach * rng.next_unit().sqrt();
            let angle = 2.0 * PI * rng.next_unit();
            let candidate = (r * angle.cos(), r * angle.sin());

            let gap = placed
                .iter()
                .map(|p| (p.0 - candidate.0).hypot(p.1 - candidate.1))
                .fold(f64::INFINITY, f64::min);
            if gap > best_gap {
                best_gap = gap;
                best = candidate;
            }
        }
        best
    }
}

impl BowlPhysics for ScatterBowl {
    fn compute_stone_positions(
        &self,
        current_count: usize,
        target_count: usize,
        bowl_radius: f64,
        stone_radius: f64,
        seed: u32,
        is_white_bowl: bool,
    ) -> BowlLayout {
        let reach = (bowl_radius - stone_radius).max(0.0);
        let mut positions = Vec::with_capacity(target_count);
        for index in 0..target_count {
            let position = self.place(index, &positions, reach, seed, is_white_bowl);
            positions.push(position);
        }

        let overlapping_pairs = count_overlaps(&positions, stone_radius);
        let convergence = ConvergenceInfo {
            dropped: target_count.saturating_sub(current_count),
            candidates_tried: target_count * self.candidates.max(1) as usize,
            overlapping_pairs,
            converged: overlapping_pairs == 0,
        };
        debug!(
            "{} lid: {} stones ({} dropped), {} overlapping pairs",
            if is_white_bowl { "White" } else { "Black" },
            target_count,
            convergence.dropped,
            overlapping_pairs
        );

        BowlLayout {
            positions,
            convergence,
        }
    }
}

/// Pairs of stones whose centres are closer than two radii
pub fn count_overlaps(positions: &[(f64, f64)], stone_radius: f64) -> usize {
    let min_dist = 2.0 * stone_radius;
    let mut overlaps = 0;
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            if (a.0 - b.0).hypot(a.1 - b.1) < min_dist {
                overlaps += 1;
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(count: usize, seed: u32, white: bool) -> BowlLayout {
        ScatterBowl::default().compute_stone_positions(0, count, 6.0, 0.5, seed, white)
    }

    #[test]
    fn test_empty_lid() {
        let empty = layout(0, 1, false);
        assert!(empty.is_empty());
        assert!(empty.convergence.converged);
        assert_eq!(empty.convergence.candidates_tried, 0);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(layout(25, 9, true), layout(25, 9, true));
        assert_ne!(layout(5, 9, true).positions, layout(5, 10, true).positions);
        assert_ne!(layout(5, 9, true).positions, layout(5, 9, false).positions);
    }

    #[test]
    fn test_growing_count_keeps_prefix() {
        let small = layout(10, 3, false);
        let large = layout(11, 3, false);
        assert_eq!(&large.positions[..10], &small.positions[..]);
    }

    #[test]
    fn test_stones_stay_in_lid() {
        for (x, y) in layout(60, 5, true).positions {
            assert!(x.hypot(y) <= 5.5 + 1e-12);
        }
    }

    #[test]
    fn test_lid_smaller_than_stone() {
        let tiny = ScatterBowl::default().compute_stone_positions(0, 3, 0.2, 0.5, 1, false);
        assert!(tiny.positions.iter().all(|&p| p == (0.0, 0.0)));
        assert_eq!(tiny.convergence.overlapping_pairs, 3);
        assert!(!tiny.convergence.converged);
    }

    #[test]
    fn test_dropped_counts_new_stones() {
        let bowl = ScatterBowl::new(4);
        let grown = bowl.compute_stone_positions(3, 7, 6.0, 0.5, 2, false);
        assert_eq!(grown.convergence.dropped, 4);
        assert_eq!(grown.convergence.candidates_tried, 28);

        let shrunk = bowl.compute_stone_positions(7, 3, 6.0, 0.5, 2, false);
        assert_eq!(shrunk.convergence.dropped, 0);
        assert_eq!(shrunk.len(), 3);
    }

    #[test]
    fn test_overlap_count() {
        let positions = [(0.0, 0.0), (0.5, 0.0), (3.0, 0.0)];
        assert_eq!(count_overlaps(&positions, 0.5), 1);
        assert_eq!(count_overlaps(&positions, 2.0), 3);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let physics: Box<dyn BowlPhysics> = Box::new(ScatterBowl::default());
        let layout = physics.compute_stone_positions(0, 4, 6.0, 0.5, 1, true);
        assert_eq!(layout.len(), 4);
        assert_eq!(
            layout.convergence.overlapping_pairs,
            count_overlaps(&layout.positions, 0.5)
        );
    }
}
