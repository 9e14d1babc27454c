//! Bounded local relaxation over a 3x3 window.
//!
//! Only right and down neighbour pairs are checked so each pair is visited
//! once per round. The solver never looks beyond the window.

use crate::Offset2D;

/// Grid displacement scale used when two stones sit on the same point
const COINCIDENT_NUDGE: f64 = 1e-6;

/// Distances this close to the minimum count as touching
const CONTACT_TOLERANCE: f64 = 1e-9;

/// One occupied cell of the window
#[derive(Clone, Copy, Debug)]
pub(crate) struct WindowCell {
    pub x: u8,
    pub y: u8,
    pub offset: Offset2D,
    /// Anchored cells never move
    pub anchored: bool,
}

impl WindowCell {
    fn position(&self, radius: f64) -> (f64, f64) {
        (
            self.x as f64 + self.offset.dx * radius,
            self.y as f64 + self.offset.dy * radius,
        )
    }
}

/// Result of one relaxation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RelaxOutcome {
    /// Rounds run
    pub rounds: u32,
    /// True if the last round found no overlapping pair
    pub converged: bool,
}

pub(crate) struct RelaxParams {
    pub radius: f64,
    pub min_separation: f64,
    pub clamp: f64,
    pub iterations: u32,
}

/// Window of up to nine cells indexed by grid offset from the top-left corner
pub(crate) struct Window {
    cells: [Option<WindowCell>; 9],
    x0: u8,
    y0: u8,
}

impl Window {
    pub fn new(x0: u8, y0: u8) -> Self {
        Window {
            cells: [None; 9],
            x0,
            y0,
        }
    }

    fn slot(&self, x: u8, y: u8) -> Option<usize> {
        let dx = x.checked_sub(self.x0)? as usize;
        let dy = y.checked_sub(self.y0)? as usize;
        (dx < 3 && dy < 3).then_some(dy * 3 + dx)
    }

    pub fn insert(&mut self, cell: WindowCell) {
        if let Some(slot) = self.slot(cell.x, cell.y) {
            self.cells[slot] = Some(cell);
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &WindowCell> {
        self.cells.iter().flatten()
    }

    pub fn get(&self, x: u8, y: u8) -> Option<&WindowCell> {
        self.slot(x, y).and_then(|slot| self.cells[slot].as_ref())
    }

    /// Push overlapping neighbours apart for at most `params.iterations` rounds
    pub fn relax(&mut self, params: &RelaxParams) -> RelaxOutcome {
        let radius = params.radius;
        let mut outcome = RelaxOutcome::default();
        if radius <= 0.0 {
            outcome.converged = true;
            return outcome;
        }

        for _ in 0..params.iterations {
            outcome.rounds += 1;
            let mut pushed = false;

            for slot in 0..9 {
                let (col, row) = (slot % 3, slot / 3);
                // Right neighbour, then down neighbour
                if col < 2 {
                    pushed |= self.separate(slot, slot + 1, params);
                }
                if row < 2 {
                    pushed |= self.separate(slot, slot + 3, params);
                }
            }

            if !pushed {
                outcome.converged = true;
                break;
            }
        }

        outcome
    }

    /// Separate one pair. Returns true if the pair overlapped.
    fn separate(&mut self, first: usize, second: usize, params: &RelaxParams) -> bool {
        let (Some(a), Some(b)) = (self.cells[first], self.cells[second]) else {
            return false;
        };

        let radius = params.radius;
        let (ax, ay) = a.position(radius);
        let (bx, by) = b.position(radius);
        let (mut vx, mut vy) = (bx - ax, by - ay);
        let mut dist = vx.hypot(vy);

        if dist >= params.min_separation - CONTACT_TOLERANCE {
            return false;
        }

        if dist <= f64::EPSILON {
            vx = (b.x as f64 - a.x as f64) * COINCIDENT_NUDGE;
            vy = (b.y as f64 - a.y as f64) * COINCIDENT_NUDGE;
            dist = vx.hypot(vy);
        }

        let (ux, uy) = (vx / dist, vy / dist);
        let deficit = params.min_separation - dist;

        // Anchored partners hand the whole deficit to the free stone
        let (share_a, share_b) = match (a.anchored, b.anchored) {
            (false, false) => (0.5, 0.5),
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            (true, true) => return true,
        };

        let push_a = deficit * share_a / radius;
        let push_b = deficit * share_b / radius;

        if let Some(cell) = self.cells[first].as_mut() {
            cell.offset =
                Offset2D::new(cell.offset.dx - ux * push_a, cell.offset.dy - uy * push_a)
                    .clamped(params.clamp);
        }
        if let Some(cell) = self.cells[second].as_mut() {
            cell.offset =
                Offset2D::new(cell.offset.dx + ux * push_b, cell.offset.dy + uy * push_b)
                    .clamped(params.clamp);
        }

        true
    }
}
