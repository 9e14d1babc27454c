//! Per-game jitter field.
//!
//! Each cell keeps an initial offset drawn when a stone first appears there,
//! a working offset refined by relaxation, and a settled mark once the offset
//! has been returned for the current move. Initial offsets survive across
//! moves for as long as the cell stays occupied.

use crate::relax::{RelaxParams, Window, WindowCell};
use crate::{JitterConfig, Offset2D, RelaxOutcome};
use log::{debug, trace};
use sgfplay_core::Board;
use stonerandom::{next_gaussian_pair, seed};

/// Occupied cells of a board snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    size: u8,
    cells: Vec<bool>,
}

impl Occupancy {
    /// Empty grid
    pub fn new(size: u8) -> Self {
        Occupancy {
            size,
            cells: vec![false; size as usize * size as usize],
        }
    }

    pub fn from_board(board: &Board) -> Self {
        let mut occupancy = Occupancy::new(board.size());
        for (pos, _) in board.occupied_positions() {
            occupancy.set(pos.x, pos.y, true);
        }
        occupancy
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn set(&mut self, x: u8, y: u8, occupied: bool) {
        if x < self.size && y < self.size {
            self.cells[y as usize * self.size as usize + x as usize] = occupied;
        }
    }

    /// False outside the grid
    pub fn is_occupied(&self, x: u8, y: u8) -> bool {
        x < self.size && y < self.size && self.cells[y as usize * self.size as usize + x as usize]
    }
}

/// Deterministic jitter for every stone of one game
#[derive(Clone, Debug)]
pub struct JitterField {
    size: u8,
    salt: u32,
    config: JitterConfig,
    initial: Vec<Option<Offset2D>>,
    working: Vec<Option<Offset2D>>,
    settled: Vec<bool>,
    last_prepared_move: Option<usize>,
    last_outcome: RelaxOutcome,
}

impl JitterField {
    /// Field for a `size` x `size` board. `salt` separates games that would
    /// otherwise draw identical offsets.
    pub fn new(size: u8, salt: u32, config: JitterConfig) -> Self {
        let cells = size as usize * size as usize;
        JitterField {
            size,
            salt,
            config,
            initial: vec![None; cells],
            working: vec![None; cells],
            settled: vec![false; cells],
            last_prepared_move: None,
            last_outcome: RelaxOutcome::default(),
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn salt(&self) -> u32 {
        self.salt
    }

    pub fn config(&self) -> &JitterConfig {
        &self.config
    }

    /// Replace the configuration and drop every stored offset
    pub fn set_config(&mut self, config: JitterConfig) {
        self.config = config;
        self.reset();
    }

    pub fn last_prepared_move(&self) -> Option<usize> {
        self.last_prepared_move
    }

    /// Outcome of the most recent relaxation
    pub fn last_outcome(&self) -> RelaxOutcome {
        self.last_outcome
    }

    #[inline]
    fn index(&self, x: u8, y: u8) -> Option<usize> {
        (x < self.size && y < self.size).then(|| y as usize * self.size as usize + x as usize)
    }

    pub fn initial(&self, x: u8, y: u8) -> Option<Offset2D> {
        self.index(x, y).and_then(|i| self.initial[i])
    }

    /// Offset already returned for the prepared move
    pub fn final_offset(&self, x: u8, y: u8) -> Option<Offset2D> {
        let i = self.index(x, y)?;
        if self.settled[i] {
            self.working[i]
        } else {
            None
        }
    }

    /// Drop every stored offset and mark
    pub fn reset(&mut self) {
        self.initial.fill(None);
        self.working.fill(None);
        self.settled.fill(false);
        self.last_prepared_move = None;
        self.last_outcome = RelaxOutcome::default();
    }

    /// Start a new move. Occupied cells keep their initial offset; empty
    /// cells forget theirs so a later stone there draws a fresh one.
    pub fn prepare(&mut self, move_index: usize, occupied: &Occupancy) {
        if self.last_prepared_move == Some(move_index) {
            return;
        }

        if occupied.size() != self.size {
            debug!(
                "Occupancy size {} differs from field size {}",
                occupied.size(),
                self.size
            );
        }

        for y in 0..self.size {
            for x in 0..self.size {
                let i = y as usize * self.size as usize + x as usize;
                self.working[i] = None;
                self.settled[i] = false;
                if !occupied.is_occupied(x, y) {
                    self.initial[i] = None;
                }
            }
        }
        self.last_prepared_move = Some(move_index);
    }

    /// Offset of the stone at `(x, y)` for `move_index`, `None` off the board.
    ///
    /// The first query of a new move index prepares the field with `occupied`.
    /// Once returned, an offset stays fixed until the next move.
    pub fn offset(
        &mut self,
        x: u8,
        y: u8,
        move_index: usize,
        radius: f64,
        occupied: &Occupancy,
    ) -> Option<Offset2D> {
        let i = self.index(x, y)?;

        if self.last_prepared_move != Some(move_index) {
            self.prepare(move_index, occupied);
        }

        if self.settled[i] {
            return self.working[i];
        }

        let clamp = self.config.effective_clamp();
        let mut window = self.window_around(x, y, move_index, occupied);
        // The queried cell takes part even if the snapshot shows it empty
        if window.get(x, y).is_none() {
            let offset = self.working_or_initial(x, y, move_index);
            window.insert(WindowCell {
                x,
                y,
                offset,
                anchored: false,
            });
        }

        let params = RelaxParams {
            radius,
            min_separation: self.config.min_separation(radius),
            clamp,
            iterations: self.config.iterations,
        };
        self.last_outcome = window.relax(&params);
        trace!(
            "Relaxed ({},{}) at move {} in {} rounds (converged: {})",
            x,
            y,
            move_index,
            self.last_outcome.rounds,
            self.last_outcome.converged
        );

        for cell in window.cells() {
            if let Some(j) = self.index(cell.x, cell.y) {
                if !self.settled[j] {
                    self.working[j] = Some(cell.offset);
                }
            }
        }

        let result = self.working[i].unwrap_or(Offset2D::ZERO).clamped(clamp);
        self.working[i] = Some(result);
        self.settled[i] = true;
        Some(result)
    }

    /// Occupied cells of the clipped 3x3 window around `(x, y)`
    fn window_around(&mut self, x: u8, y: u8, move_index: usize, occupied: &Occupancy) -> Window {
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x1 = x.saturating_add(1).min(self.size - 1);
        let y1 = y.saturating_add(1).min(self.size - 1);

        let mut window = Window::new(x0, y0);
        for wy in y0..=y1 {
            for wx in x0..=x1 {
                if !occupied.is_occupied(wx, wy) {
                    continue;
                }
                let Some(j) = self.index(wx, wy) else {
                    continue;
                };
                let offset = self.working_or_initial(wx, wy, move_index);
                window.insert(WindowCell {
                    x: wx,
                    y: wy,
                    offset,
                    anchored: self.settled[j],
                });
            }
        }
        window
    }

    /// Working offset if relaxation already touched the cell, else its
    /// initial offset, drawing one if needed
    fn working_or_initial(&mut self, x: u8, y: u8, move_index: usize) -> Offset2D {
        let Some(i) = self.index(x, y) else {
            return Offset2D::ZERO;
        };
        if let Some(working) = self.working[i] {
            return working;
        }
        match self.initial[i] {
            Some(initial) => initial,
            None => {
                let initial = self.synthesize(x, y, move_index);
                self.initial[i] = Some(initial);
                initial
            }
        }
    }

    /// Draw the initial offset for a stone that just appeared
    fn synthesize(&self, x: u8, y: u8, move_index: usize) -> Offset2D {
        let (xi, yi, mi) = (x as i64, y as i64, move_index as i64);

        let mut state = seed(xi, yi, mi, self.salt).get();
        let (gx, gy) = next_gaussian_pair(&mut state);

        let sign_x = axis_sign(seed(7 * xi + 1, 13 * yi + 3, mi, self.salt).get());
        let sign_y = axis_sign(seed(11 * xi + 5, 17 * yi + 7, mi, self.salt).get());

        let sigma = self.config.effective_sigma();
        Offset2D::new(gx.abs() * sigma * sign_x, gy.abs() * sigma * sign_y)
            .clamped(self.config.effective_clamp())
    }
}

/// Odd multiplier folded into a sign seed before its top bit is read
const SIGN_MIX: u32 = 0x9E37_79B1;

/// Sign of one axis from its seed.
///
/// The low bit of a seed depends only on input parities, and the XOR of the
/// two axis seeds cancels the move and salt terms. The multiply carries every
/// bit into the top one.
#[inline]
fn axis_sign(seed: u32) -> f64 {
    if seed.wrapping_mul(SIGN_MIX) >> 31 == 0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupancy(size: u8, stones: &[(u8, u8)]) -> Occupancy {
        let mut occupancy = Occupancy::new(size);
        for &(x, y) in stones {
            occupancy.set(x, y, true);
        }
        occupancy
    }

    #[test]
    fn test_occupancy_bounds() {
        let occ = occupancy(9, &[(0, 0), (8, 8)]);
        assert!(occ.is_occupied(0, 0));
        assert!(occ.is_occupied(8, 8));
        assert!(!occ.is_occupied(9, 0));
        assert!(!occ.is_occupied(4, 4));
    }

    #[test]
    fn test_out_of_bounds_query() {
        let mut field = JitterField::new(9, 0, JitterConfig::default());
        let occ = occupancy(9, &[(3, 3)]);
        assert_eq!(field.offset(9, 3, 1, 0.48, &occ), None);
        assert_eq!(field.offset(3, 200, 1, 0.48, &occ), None);
        assert_eq!(field.last_prepared_move(), None);
    }

    #[test]
    fn test_lone_stone_gets_its_initial_offset() {
        let mut field = JitterField::new(19, 0, JitterConfig::default());
        let occ = occupancy(19, &[(3, 3)]);

        let offset = field.offset(3, 3, 1, 0.48, &occ).unwrap();
        assert_eq!(Some(offset), field.initial(3, 3));
        assert_eq!(Some(offset), field.final_offset(3, 3));
        assert!(offset.within(0.22));
        assert_eq!(field.last_outcome().rounds, 1);
    }

    #[test]
    fn test_sign_rule() {
        let field = JitterField::new(19, 0, JitterConfig::default());
        let offset = field.synthesize(3, 3, 1);

        let expect_x = axis_sign(seed(22, 42, 1, 0).get());
        let expect_y = axis_sign(seed(38, 58, 1, 0).get());
        assert!(offset.dx == 0.0 || offset.dx.signum() == expect_x);
        assert!(offset.dy == 0.0 || offset.dy.signum() == expect_y);
    }

    #[test]
    fn test_axis_signs_cover_all_quadrants() {
        let mut quadrants = [0usize; 4];
        for salt in 0..4 {
            let field = JitterField::new(19, salt, JitterConfig::default());
            for y in 0..19 {
                for x in 0..19 {
                    let offset = field.synthesize(x, y, 1);
                    let q = (offset.dx < 0.0) as usize * 2 + (offset.dy < 0.0) as usize;
                    quadrants[q] += 1;
                }
            }
        }

        let total: usize = quadrants.iter().sum();
        for count in quadrants {
            assert!(
                count * 5 > total && count * 10 < total * 3,
                "quadrant counts {:?}",
                quadrants
            );
        }
    }

    #[test]
    fn test_sign_relation_varies_per_cell() {
        // The same cell must not pair its axis signs identically in every game
        let agreements: Vec<bool> = (0..16)
            .map(|salt| {
                let offset = JitterField::new(19, salt, JitterConfig::default()).synthesize(3, 3, 1);
                (offset.dx < 0.0) == (offset.dy < 0.0)
            })
            .collect();
        assert!(agreements.contains(&true) && agreements.contains(&false));
    }

    #[test]
    fn test_same_move_is_memoized() {
        let mut field = JitterField::new(9, 7, JitterConfig::default());
        let occ = occupancy(9, &[(3, 3), (3, 4), (4, 4)]);

        let first = field.offset(3, 3, 2, 0.6, &occ);
        // Neighbour queries may move (3,4) and (4,4) but not the settled (3,3)
        field.offset(3, 4, 2, 0.6, &occ);
        field.offset(4, 4, 2, 0.6, &occ);
        assert_eq!(field.offset(3, 3, 2, 0.6, &occ), first);
    }

    #[test]
    fn test_prepare_same_index_is_noop() {
        let mut field = JitterField::new(9, 0, JitterConfig::default());
        let occ = occupancy(9, &[(3, 3)]);
        let offset = field.offset(3, 3, 1, 0.48, &occ);

        field.prepare(1, &Occupancy::new(9));
        assert_eq!(field.final_offset(3, 3), offset);
        assert!(field.initial(3, 3).is_some());
    }

    #[test]
    fn test_prepare_forgets_empty_cells() {
        let mut field = JitterField::new(9, 0, JitterConfig::default());
        field.offset(3, 3, 1, 0.48, &occupancy(9, &[(3, 3), (6, 6)]));
        field.offset(6, 6, 1, 0.48, &occupancy(9, &[(3, 3), (6, 6)]));

        field.prepare(2, &occupancy(9, &[(3, 3)]));
        assert!(field.initial(3, 3).is_some());
        assert!(field.initial(6, 6).is_none());
        assert!(field.final_offset(3, 3).is_none());
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut field = JitterField::new(9, 0, JitterConfig::default());
        field.offset(3, 3, 1, 0.48, &occupancy(9, &[(3, 3)]));
        field.reset();
        assert_eq!(field.initial(3, 3), None);
        assert_eq!(field.final_offset(3, 3), None);
        assert_eq!(field.last_prepared_move(), None);
    }

    #[test]
    fn test_zero_eccentricity_places_on_grid() {
        let config = JitterConfig::default().with_eccentricity(0.0);
        let mut field = JitterField::new(9, 0, config);
        let occ = occupancy(9, &[(3, 3), (3, 4)]);
        assert_eq!(field.offset(3, 3, 1, 0.6, &occ), Some(Offset2D::ZERO));
        assert_eq!(field.offset(3, 4, 1, 0.6, &occ), Some(Offset2D::ZERO));
    }
}
