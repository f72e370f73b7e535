use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Manhattan distance to another cell
    pub fn manhattan(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// One entry of the pellet catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PelletKind {
    /// Points added to the eater's score
    pub score: u32,
    /// Extra body cells granted to the eater
    pub growth: u32,
}

impl PelletKind {
    pub fn new(score: u32, growth: u32) -> Self {
        Self { score, growth }
    }
}

/// A pellet lying on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pellet {
    pub position: Position,
    /// Index into the configured pellet catalog
    pub type_index: usize,
}

impl Pellet {
    pub fn new(position: Position, type_index: usize) -> Self {
        Self {
            position,
            type_index,
        }
    }
}

/// Type of collision that killed a worm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Worm left the grid
    Wall,
    /// Worm ran into its own body
    SelfCollision,
    /// Worm ran into another living worm
    Rival,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(2, 3);
        assert_eq!(a.manhattan(Position::new(2, 3)), 0);
        assert_eq!(a.manhattan(Position::new(5, 1)), 5);
        assert_eq!(a.manhattan(Position::new(-1, 3)), 3);
    }
}
