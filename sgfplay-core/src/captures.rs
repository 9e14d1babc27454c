//! Capture accounting derived from board snapshots.
//!
//! Captures are not tracked move by move. They are recovered from the
//! difference between how many stones of a colour were ever placed and how
//! many are still on the board, which keeps them correct as long as the
//! replay engine's snapshot already reflects every removal.

use crate::{Board, Color, Move, SetupStone};

/// Stones of each colour that have left the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CaptureCounts {
    pub black_captured: usize,
    pub white_captured: usize,
}

impl CaptureCounts {
    /// Stones of `color` that have been captured
    pub fn captured(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black_captured,
            Color::White => self.white_captured,
        }
    }

    /// Prisoners held by `color`, i.e. captured stones of the opponent
    pub fn prisoners_held_by(&self, color: Color) -> usize {
        self.captured(color.opponent())
    }
}

/// Derive capture counts for the position after `move_index` moves.
///
/// Placed stones of a colour are its setup stones plus its non-pass moves in
/// `moves[..move_index]`. An index past the end of `moves` counts every move.
pub fn captures(
    move_index: usize,
    setup: &[SetupStone],
    moves: &[Move],
    board: &Board,
) -> CaptureCounts {
    let played = &moves[..move_index.min(moves.len())];

    let placed = |color: Color| {
        let from_setup = setup.iter().filter(|s| s.color == color).count();
        let from_moves = played
            .iter()
            .filter(|m| m.color == color && !m.is_pass())
            .count();
        from_setup + from_moves
    };

    CaptureCounts {
        black_captured: placed(Color::Black).saturating_sub(board.count(Color::Black)),
        white_captured: placed(Color::White).saturating_sub(board.count(Color::White)),
    }
}
