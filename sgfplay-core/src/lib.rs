mod board;
mod captures;
mod notation;
mod record;
mod replay;
mod stone;

pub use board::Board;
pub use captures::{captures, CaptureCounts};
pub use notation::{format_move, parse_move, parse_moves, parse_setup, MoveParseError};
pub use record::{GameFingerprint, GameRecord, RecordError, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use replay::{GoReplay, ReplayEngine};
pub use stone::{BoardPosition, Color, Move, SetupStone};
