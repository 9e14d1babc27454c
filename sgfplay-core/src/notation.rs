//! Compact move notation used by the command line tools.
//!
//! Format: `B:3,3` places a black stone at column 3, row 3; `W:pass` is a
//! white pass. Lists are whitespace separated. This is deliberately not SGF.

use crate::{BoardPosition, Color, Move, SetupStone};
use thiserror::Error;

/// Error from parsing move notation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("expected COLOR:X,Y or COLOR:pass, got '{0}'")]
    Malformed(String),

    #[error("unknown colour '{0}'")]
    UnknownColor(String),

    #[error("bad coordinate '{0}'")]
    BadCoordinate(String),

    #[error("setup stones cannot pass: '{0}'")]
    SetupPass(String),
}

/// Parse a single move token
pub fn parse_move(token: &str) -> Result<Move, MoveParseError> {
    let (color_str, rest) = token
        .split_once(':')
        .ok_or_else(|| MoveParseError::Malformed(token.to_string()))?;

    let mut chars = color_str.chars();
    let color = match (chars.next(), chars.next()) {
        (Some(c), None) => {
            Color::from_char(c).ok_or_else(|| MoveParseError::UnknownColor(color_str.to_string()))?
        }
        _ => return Err(MoveParseError::UnknownColor(color_str.to_string())),
    };

    if rest.eq_ignore_ascii_case("pass") {
        return Ok(Move::pass(color));
    }

    let (x_str, y_str) = rest
        .split_once(',')
        .ok_or_else(|| MoveParseError::Malformed(token.to_string()))?;
    let x: u8 = x_str
        .trim()
        .parse()
        .map_err(|_| MoveParseError::BadCoordinate(x_str.to_string()))?;
    let y: u8 = y_str
        .trim()
        .parse()
        .map_err(|_| MoveParseError::BadCoordinate(y_str.to_string()))?;

    Ok(Move::play(color, x, y))
}

/// Parse a whitespace separated list of moves
pub fn parse_moves(input: &str) -> Result<Vec<Move>, MoveParseError> {
    input.split_whitespace().map(parse_move).collect()
}

/// Parse a whitespace separated list of setup stones (passes rejected)
pub fn parse_setup(input: &str) -> Result<Vec<SetupStone>, MoveParseError> {
    input
        .split_whitespace()
        .map(|token| {
            let mv = parse_move(token)?;
            match mv.position {
                Some(position) => Ok(SetupStone {
                    color: mv.color,
                    position,
                }),
                None => Err(MoveParseError::SetupPass(token.to_string())),
            }
        })
        .collect()
}

/// Format a move in the same notation
pub fn format_move(mv: &Move) -> String {
    match mv.position {
        Some(BoardPosition { x, y }) => format!("{}:{},{}", mv.color.to_char(), x, y),
        None => format!("{}:pass", mv.color.to_char()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_and_pass() {
        assert_eq!(parse_move("B:3,3"), Ok(Move::play(Color::Black, 3, 3)));
        assert_eq!(parse_move("w:15,4"), Ok(Move::play(Color::White, 15, 4)));
        assert_eq!(parse_move("W:pass"), Ok(Move::pass(Color::White)));
        assert_eq!(parse_move("B:PASS"), Ok(Move::pass(Color::Black)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_move("B3,3"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(parse_move("X:3,3"), Err(MoveParseError::UnknownColor(_))));
        assert!(matches!(parse_move("BW:3,3"), Err(MoveParseError::UnknownColor(_))));
        assert!(matches!(parse_move("B:3"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(parse_move("B:a,3"), Err(MoveParseError::BadCoordinate(_))));
        assert!(matches!(parse_move("B:3,-1"), Err(MoveParseError::BadCoordinate(_))));
    }

    #[test]
    fn test_parse_lists() {
        let moves = parse_moves("B:3,3  W:3,4\nB:pass").unwrap();
        assert_eq!(
            moves,
            vec![
                Move::play(Color::Black, 3, 3),
                Move::play(Color::White, 3, 4),
                Move::pass(Color::Black),
            ]
        );
        assert!(parse_moves("").unwrap().is_empty());

        let setup = parse_setup("B:2,2 W:6,6").unwrap();
        assert_eq!(setup[1], SetupStone::new(Color::White, 6, 6));
        assert!(matches!(parse_setup("B:pass"), Err(MoveParseError::SetupPass(_))));
    }

    #[test]
    fn test_format_matches_parse() {
        for token in ["B:3,3", "W:pass", "W:18,0"] {
            let mv = parse_move(token).unwrap();
            assert_eq!(format_move(&mv), token);
        }
    }
}
