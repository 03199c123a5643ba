use crate::geometry::Separation;
use crate::state::{Direction, Position};

/// Tile geometry supplied by the host map.
pub trait MapOracle {
    /// Offset and distance from `from` to `to`.
    ///
    /// The default uses Euclidean tile distance; maps with looping edges or
    /// custom metrics override it.
    fn separation(&self, from: Position, to: Position) -> Separation {
        Separation::between(from, to)
    }

    /// True when a character standing on `from` can step in `direction`.
    fn is_passable(&self, from: Position, direction: Direction) -> bool;
}

/// Rectangular map backed by a passability grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMap {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

impl GridMap {
    /// Open map with every tile passable.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Parses rows of `#` (wall) and any other character (floor).
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let height = rows.len() as u32;
        let width = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0) as u32;
        let mut map = Self::open(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, tile) in row.as_ref().chars().enumerate() {
                if tile == '#' {
                    map.set_blocked(Position::new(x as i32, y as i32), true);
                }
            }
        }
        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub fn set_blocked(&mut self, position: Position, blocked: bool) {
        if let Some(index) = self.index(position) {
            self.blocked[index] = blocked;
        }
    }

    pub fn is_blocked(&self, position: Position) -> bool {
        self.index(position).is_none_or(|index| self.blocked[index])
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }
}

impl MapOracle for GridMap {
    fn is_passable(&self, from: Position, direction: Direction) -> bool {
        !self.is_blocked(from.step(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_and_edges_block() {
        let map = GridMap::from_rows(&["..#", "...", "..."]);
        assert!(map.is_passable(Position::new(0, 0), Direction::Right));
        assert!(!map.is_passable(Position::new(1, 0), Direction::Right));
        assert!(!map.is_passable(Position::new(0, 0), Direction::Up));
        assert!(!map.is_passable(Position::new(2, 2), Direction::Down));
    }
}
