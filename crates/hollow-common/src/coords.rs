//! Coordinate types for the dungeon grid and world space.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Cell on the dungeon layout grid. One cell holds at most one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct GridCoord {
    /// X coordinate in grid cells
    pub x: i32,
    /// Y coordinate in grid cells
    pub y: i32,
}

impl GridCoord {
    /// The start room's cell.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring cell in `dir`. `Direction::None` returns `self`.
    #[must_use]
    pub const fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Direction from `self` to an adjacent cell, or `None` when not adjacent.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Direction {
        Direction::from_delta(other.x - self.x, other.y - self.y)
    }

    /// Manhattan distance in cells.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Converts to a world position, `spacing` world units per cell.
    #[must_use]
    pub fn to_world(self, spacing: f32) -> Vec2 {
        Vec2::new(self.x as f32 * spacing, self.y as f32 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_and_direction() {
        let c = GridCoord::new(1, 1);
        assert_eq!(c.step(Direction::Up), GridCoord::new(1, 2));
        assert_eq!(c.step(Direction::Left), GridCoord::new(0, 1));
        assert_eq!(c.step(Direction::None), c);
        assert_eq!(c.direction_to(GridCoord::new(2, 1)), Direction::Right);
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(GridCoord::new(-2, 3).manhattan(GridCoord::new(1, -1)), 7);
    }

    #[test]
    fn test_to_world() {
        let pos = GridCoord::new(2, -1).to_world(30.0);
        assert!((pos.x - 60.0).abs() < f32::EPSILON);
        assert!((pos.y + 30.0).abs() < f32::EPSILON);
    }
}
