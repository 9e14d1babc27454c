use crate::{BoardPosition, Color};
use std::fmt;

/// Snapshot of board occupancy at one point of a replay
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: u8,
    cells: Vec<Option<Color>>,
}

impl Board {
    /// Create an empty board
    pub fn new(size: u8) -> Self {
        Board {
            size,
            cells: vec![None; size as usize * size as usize],
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, pos: BoardPosition) -> bool {
        pos.is_on_board(self.size)
    }

    #[inline]
    fn index(&self, pos: BoardPosition) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.size as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Colour of the stone at `pos`, `None` if the point is empty or off the board
    pub fn get(&self, pos: BoardPosition) -> Option<Color> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// Set or clear a point. Returns false if `pos` is off the board.
    pub fn set(&mut self, pos: BoardPosition, stone: Option<Color>) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = stone;
                true
            }
            None => false,
        }
    }

    /// Number of stones of a colour on the board
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Total number of stones on the board
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied points in row-major order
    pub fn occupied_positions(&self) -> impl Iterator<Item = (BoardPosition, Color)> + '_ {
        let size = self.size as usize;
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.map(|color| (BoardPosition::new((i % size) as u8, (i / size) as u8), color))
        })
    }

    /// Connected group of same-coloured stones containing `pos`
    pub fn group_at(&self, pos: BoardPosition) -> Vec<BoardPosition> {
        let color = match self.get(pos) {
            Some(color) => color,
            None => return Vec::new(),
        };

        let mut visited = vec![false; self.cells.len()];
        let mut group = Vec::new();
        let mut stack = vec![pos];

        while let Some(p) = stack.pop() {
            let i = match self.index(p) {
                Some(i) => i,
                None => continue,
            };
            if visited[i] || self.cells[i] != Some(color) {
                continue;
            }
            visited[i] = true;
            group.push(p);
            stack.extend(p.neighbors(self.size));
        }

        group
    }

    /// True if any stone of the group touches an empty point
    pub fn has_liberty(&self, group: &[BoardPosition]) -> bool {
        group.iter().any(|p| {
            p.neighbors(self.size)
                .any(|n| self.index(n).is_some_and(|i| self.cells[i].is_none()))
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.size {
            let row: String = (0..self.size)
                .map(|x| match self.get(BoardPosition::new(x, y)) {
                    Some(color) => color.board_char(),
                    None => '.',
                })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
