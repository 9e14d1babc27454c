use std::fmt;

/// Stone colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// Both colours, black first
    pub const ALL: [Color; 2] = [Color::Black, Color::White];

    /// Convert from index (0-1)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Color::Black),
            1 => Some(Color::White),
            _ => None,
        }
    }

    /// The other colour
    pub fn opponent(&self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Get the colour as a character (B, W)
    pub fn to_char(&self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    /// Parse a colour character, case-insensitive
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'B' => Some(Color::Black),
            'W' => Some(Color::White),
            _ => None,
        }
    }

    /// Character used by the ASCII board renderer
    pub fn board_char(&self) -> char {
        match self {
            Color::Black => 'X',
            Color::White => 'O',
        }
    }
}

/// A board intersection, column `x` and row `y`, both zero-based.
///
/// Ordering is row-major (`y` first) so sorted collections iterate the board
/// the way it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardPosition {
    pub x: u8,
    pub y: u8,
}

impl BoardPosition {
    pub fn new(x: u8, y: u8) -> Self {
        BoardPosition { x, y }
    }

    /// True if the position lies on a board of the given size
    pub fn is_on_board(&self, size: u8) -> bool {
        self.x < size && self.y < size
    }

    /// Orthogonal neighbours that lie on the board
    pub fn neighbors(&self, size: u8) -> impl Iterator<Item = BoardPosition> {
        let (x, y) = (self.x as i16, self.y as i16);
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < size as i16 && ny < size as i16)
            .map(|(nx, ny)| BoardPosition::new(nx as u8, ny as u8))
    }
}

impl Ord for BoardPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for BoardPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A played move. `position == None` is a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub color: Color,
    pub position: Option<BoardPosition>,
}

impl Move {
    pub fn play(color: Color, x: u8, y: u8) -> Self {
        Move {
            color,
            position: Some(BoardPosition::new(x, y)),
        }
    }

    pub fn pass(color: Color) -> Self {
        Move {
            color,
            position: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.position.is_none()
    }
}

/// A stone placed before the first move (handicap or problem setup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetupStone {
    pub color: Color,
    pub position: BoardPosition,
}

impl SetupStone {
    pub fn new(color: Color, x: u8, y: u8) -> Self {
        SetupStone {
            color,
            position: BoardPosition::new(x, y),
        }
    }
}
