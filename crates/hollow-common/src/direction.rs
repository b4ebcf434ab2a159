//! Pathway directions between neighbouring dungeon rooms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a pathway leaving a room.
///
/// The declaration order is the canonical sort order used when building
/// layout signatures: `None < Up < Down < Left < Right`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Direction {
    /// No pathway. Never a valid stored connection.
    #[default]
    None,
    /// Towards +Y
    Up,
    /// Towards -Y
    Down,
    /// Towards -X
    Left,
    /// Towards +X
    Right,
}

impl Direction {
    /// The four directions a room can actually connect through.
    pub const CARDINALS: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the direction pointing back the way this one came.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit grid delta `(dx, dy)` for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Upper-case name, as used in layout signatures.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }

    /// Returns true for every direction except [`Direction::None`].
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Looks up the direction whose delta equals `(dx, dy)`.
    #[must_use]
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        Self::CARDINALS
            .into_iter()
            .find(|dir| dir.delta() == (dx, dy))
            .unwrap_or(Self::None)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in [
            Direction::None,
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn test_opposite_deltas_cancel() {
        for dir in Direction::CARDINALS {
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
            assert_eq!(Direction::from_delta(dx, dy), dir);
        }
    }

    #[test]
    fn test_sort_order() {
        let mut dirs = vec![
            Direction::Right,
            Direction::Up,
            Direction::Left,
            Direction::None,
            Direction::Down,
        ];
        dirs.sort();
        assert_eq!(
            dirs,
            vec![
                Direction::None,
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right
            ]
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Direction::Up.to_string(), "UP");
        assert_eq!(Direction::None.to_string(), "NONE");
        assert!(!Direction::None.is_cardinal());
        assert!(Direction::Left.is_cardinal());
    }
}
