use crate::{BoardPosition, Move, SetupStone};
use std::fmt;
use thiserror::Error;

pub const MIN_BOARD_SIZE: u8 = 2;
pub const MAX_BOARD_SIZE: u8 = 25;

/// Errors raised while building a game record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("board size {0} outside {min}..={max}", min = MIN_BOARD_SIZE, max = MAX_BOARD_SIZE)]
    InvalidSize(u8),

    #[error("setup stone {index} at {position} is off a {size}x{size} board")]
    SetupOffBoard {
        index: usize,
        position: BoardPosition,
        size: u8,
    },

    #[error("move {index} at {position} is off a {size}x{size} board")]
    MoveOffBoard {
        index: usize,
        position: BoardPosition,
        size: u8,
    },
}

/// Opaque identifier of a game's content.
///
/// Used as the cache key and folded into every jitter seed, so two records
/// with the same content always share placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameFingerprint(String);

impl GameFingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        GameFingerprint(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameFingerprint {
    fn from(value: &str) -> Self {
        GameFingerprint::new(value)
    }
}

/// A replayable game: board size, setup stones and the ordered moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    size: u8,
    setup: Vec<SetupStone>,
    moves: Vec<Move>,
}

impl GameRecord {
    /// Build a record, checking the size and every coordinate
    pub fn new(size: u8, setup: Vec<SetupStone>, moves: Vec<Move>) -> Result<Self, RecordError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(RecordError::InvalidSize(size));
        }

        for (index, stone) in setup.iter().enumerate() {
            if !stone.position.is_on_board(size) {
                return Err(RecordError::SetupOffBoard {
                    index,
                    position: stone.position,
                    size,
                });
            }
        }

        for (index, mv) in moves.iter().enumerate() {
            if let Some(position) = mv.position {
                if !position.is_on_board(size) {
                    return Err(RecordError::MoveOffBoard {
                        index,
                        position,
                        size,
                    });
                }
            }
        }

        Ok(GameRecord { size, setup, moves })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn setup(&self) -> &[SetupStone] {
        &self.setup
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of moves; valid state indices are `0..=move_count()`
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Content fingerprint: FNV-1a 64 over a canonical text encoding, as hex
    pub fn fingerprint(&self) -> GameFingerprint {
        let mut canonical = format!("SZ[{}]", self.size);
        for stone in &self.setup {
            canonical.push_str(&format!(
                ";A{}[{}]",
                stone.color.to_char(),
                stone.position
            ));
        }
        for mv in &self.moves {
            match mv.position {
                Some(pos) => canonical.push_str(&format!(";{}[{}]", mv.color.to_char(), pos)),
                None => canonical.push_str(&format!(";{}[]", mv.color.to_char())),
            }
        }

        GameFingerprint(format!("{:016x}", fnv1a_64(canonical.as_bytes())))
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET_BASIS, |h, &b| (h ^ b as u64).wrapping_mul(PRIME))
}
