use sgfplay_bowl::BowlLayout;
use sgfplay_core::{Board, BoardPosition, CaptureCounts, Move};
use sgfplay_jitter::Offset2D;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Bowl layouts of both lids.
///
/// Each lid holds the captured stones of one colour: `black` holds black
/// stones, `white` holds white stones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BowlPair {
    pub black: Arc<BowlLayout>,
    pub white: Arc<BowlLayout>,
}

/// Everything a viewer needs to draw one move index.
///
/// Immutable once appended to the cache.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedGameState {
    pub move_index: usize,
    pub board: Arc<Board>,
    pub captures: CaptureCounts,
    pub bowls: BowlPair,
    /// Offset of every stone on the board, in stone-radius units
    pub offsets: BTreeMap<BoardPosition, Offset2D>,
    /// Move that produced this position, `None` at index 0
    pub last_move: Option<Move>,
}

impl CachedGameState {
    pub fn offset(&self, pos: BoardPosition) -> Option<Offset2D> {
        self.offsets.get(&pos).copied()
    }

    /// Offset of the stone at `pos`, or no offset for an empty point
    pub fn offset_or_zero(&self, pos: BoardPosition) -> Offset2D {
        self.offset(pos).unwrap_or(Offset2D::ZERO)
    }

    /// Copy sharing board and bowls but carrying other offsets
    pub fn with_offsets(&self, offsets: BTreeMap<BoardPosition, Offset2D>) -> Self {
        CachedGameState {
            move_index: self.move_index,
            board: Arc::clone(&self.board),
            captures: self.captures,
            bowls: self.bowls.clone(),
            offsets,
            last_move: self.last_move,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgfplay_core::Color;

    fn state() -> CachedGameState {
        let mut board = Board::new(9);
        board.set(BoardPosition::new(3, 3), Some(Color::Black));
        let mut offsets = BTreeMap::new();
        offsets.insert(BoardPosition::new(3, 3), Offset2D::new(0.1, -0.05));

        CachedGameState {
            move_index: 1,
            board: Arc::new(board),
            captures: CaptureCounts::default(),
            bowls: BowlPair::default(),
            offsets,
            last_move: Some(Move::play(Color::Black, 3, 3)),
        }
    }

    #[test]
    fn test_offset_lookup() {
        let state = state();
        assert_eq!(
            state.offset(BoardPosition::new(3, 3)),
            Some(Offset2D::new(0.1, -0.05))
        );
        assert_eq!(state.offset(BoardPosition::new(4, 4)), None);
        assert_eq!(state.offset_or_zero(BoardPosition::new(4, 4)), Offset2D::ZERO);
    }

    #[test]
    fn test_with_offsets_shares_snapshot() {
        let state = state();
        let moved = state.with_offsets(BTreeMap::new());
        assert!(Arc::ptr_eq(&state.board, &moved.board));
        assert!(Arc::ptr_eq(&state.bowls.black, &moved.bowls.black));
        assert!(moved.offsets.is_empty());
        assert_eq!(moved.move_index, 1);
    }
}
