//! Deterministic replay of a game record.
//!
//! The replay engine is the source of board snapshots for every cached
//! state. It must be deterministic: seeking to an index of a freshly loaded
//! game always yields the same board.

use crate::{Board, BoardPosition, GameRecord, Move};
use log::trace;

/// Board snapshot source consumed by the state cache
pub trait ReplayEngine: Send {
    /// Load a game and position the replay at index 0 (setup only)
    fn load(&mut self, record: &GameRecord);

    /// Move to the position after `index` moves. Returns false, leaving the
    /// board untouched, if nothing is loaded or `index` is past the last move.
    fn seek(&mut self, index: usize) -> bool;

    /// Board at the current index
    fn board(&self) -> &Board;

    /// Move that produced the current position, `None` at index 0
    fn last_move(&self) -> Option<Move>;

    /// Current index
    fn current_index(&self) -> usize;
}

/// Replay engine for Go records.
///
/// Plays each move and removes opponent groups left without liberties.
/// Legality (suicide, ko) is not checked: a record is replayed as written.
#[derive(Debug, Clone)]
pub struct GoReplay {
    record: Option<GameRecord>,
    board: Board,
    index: usize,
}

impl GoReplay {
    pub fn new() -> Self {
        GoReplay {
            record: None,
            board: Board::new(0),
            index: 0,
        }
    }

    fn reset(&mut self) {
        let Some(record) = &self.record else {
            return;
        };

        let mut board = Board::new(record.size());
        for stone in record.setup() {
            board.set(stone.position, Some(stone.color));
        }
        self.board = board;
        self.index = 0;
    }
}

impl Default for GoReplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Place a stone and remove opponent groups it leaves without liberties
fn apply_move(board: &mut Board, mv: Move) {
    let Some(position) = mv.position else {
        return;
    };

    board.set(position, Some(mv.color));

    let opponent = mv.color.opponent();
    for neighbor in position.neighbors(board.size()) {
        if board.get(neighbor) != Some(opponent) {
            continue;
        }
        let group = board.group_at(neighbor);
        if !board.has_liberty(&group) {
            trace!("{} at {} captures {} stones", mv.color.to_char(), position, group.len());
            remove_group(board, &group);
        }
    }
}

fn remove_group(board: &mut Board, group: &[BoardPosition]) {
    for &pos in group {
        board.set(pos, None);
    }
}

impl ReplayEngine for GoReplay {
    fn load(&mut self, record: &GameRecord) {
        self.record = Some(record.clone());
        self.reset();
    }

    fn seek(&mut self, index: usize) -> bool {
        match &self.record {
            Some(record) if index <= record.move_count() => {}
            _ => return false,
        }

        // Going backwards replays from the start
        if index < self.index {
            self.reset();
        }

        if let Some(record) = &self.record {
            for &mv in &record.moves()[self.index..index] {
                apply_move(&mut self.board, mv);
            }
        }
        self.index = index;

        true
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn last_move(&self) -> Option<Move> {
        let record = self.record.as_ref()?;
        self.index
            .checked_sub(1)
            .and_then(|i| record.moves().get(i).copied())
    }

    fn current_index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, SetupStone};

    fn corner_capture() -> GameRecord {
        GameRecord::new(
            9,
            vec![],
            vec![
                Move::play(Color::Black, 0, 1),
                Move::play(Color::White, 0, 0),
                Move::play(Color::Black, 1, 0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_seek_before_load_fails() {
        let mut replay = GoReplay::new();
        assert!(!replay.seek(0));
    }

    #[test]
    fn test_setup_at_index_zero() {
        let record = GameRecord::new(
            9,
            vec![SetupStone::new(Color::Black, 2, 2), SetupStone::new(Color::White, 6, 6)],
            vec![Move::play(Color::Black, 4, 4)],
        )
        .unwrap();
        let mut replay = GoReplay::new();
        replay.load(&record);

        assert_eq!(replay.current_index(), 0);
        assert_eq!(replay.board().stone_count(), 2);
        assert_eq!(replay.last_move(), None);
    }

    #[test]
    fn test_capture_removes_group() {
        let mut replay = GoReplay::new();
        replay.load(&corner_capture());

        assert!(replay.seek(2));
        assert_eq!(replay.board().get(BoardPosition::new(0, 0)), Some(Color::White));

        assert!(replay.seek(3));
        assert_eq!(replay.board().get(BoardPosition::new(0, 0)), None);
        assert_eq!(replay.board().count(Color::White), 0);
        assert_eq!(replay.board().count(Color::Black), 2);
        assert_eq!(replay.last_move(), Some(Move::play(Color::Black, 1, 0)));
    }

    #[test]
    fn test_seek_backwards_matches_fresh_replay() {
        let record = corner_capture();

        let mut scrubbed = GoReplay::new();
        scrubbed.load(&record);
        scrubbed.seek(3);
        scrubbed.seek(1);

        let mut fresh = GoReplay::new();
        fresh.load(&record);
        fresh.seek(1);

        assert_eq!(scrubbed.board(), fresh.board());
        assert_eq!(scrubbed.current_index(), 1);
    }

    #[test]
    fn test_seek_past_end_leaves_board() {
        let mut replay = GoReplay::new();
        replay.load(&corner_capture());
        replay.seek(2);
        let before = replay.board().clone();

        assert!(!replay.seek(4));
        assert_eq!(replay.board(), &before);
        assert_eq!(replay.current_index(), 2);
    }

    #[test]
    fn test_pass_keeps_board() {
        let record = GameRecord::new(
            9,
            vec![],
            vec![Move::play(Color::Black, 3, 3), Move::pass(Color::White)],
        )
        .unwrap();
        let mut replay = GoReplay::new();
        replay.load(&record);
        replay.seek(1);
        let after_first = replay.board().clone();
        replay.seek(2);
        assert_eq!(replay.board(), &after_first);
        assert_eq!(replay.last_move(), Some(Move::pass(Color::White)));
    }

    #[test]
    fn test_overwritten_stone_counts_as_captured() {
        let record = GameRecord::new(
            9,
            vec![],
            vec![Move::play(Color::Black, 3, 3), Move::play(Color::White, 3, 3)],
        )
        .unwrap();
        let mut replay = GoReplay::new();
        replay.load(&record);
        assert!(replay.seek(2));
        assert_eq!(replay.board().get(BoardPosition::new(3, 3)), Some(Color::White));
        assert_eq!(replay.board().count(Color::Black), 0);

        // Placed minus present: the replaced black stone is a prisoner
        let counts = crate::captures(2, record.setup(), record.moves(), replay.board());
        assert_eq!(counts.black_captured, 1);
        assert_eq!(counts.white_captured, 0);
    }
}
