//! # Hollow Common
//!
//! Common types shared by the Hollow crates.
//!
//! This crate provides the leaf value types used across all Hollow subsystems:
//! - Pathway directions and their grid deltas
//! - Coordinate types (dungeon grid, world space)
//! - ID types (RoomId, BedId, VillagerId)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod direction;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::direction::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_step_round_trip() {
        let origin = GridCoord::ORIGIN;
        for dir in Direction::CARDINALS {
            let there = origin.step(dir);
            assert_ne!(there, origin);
            assert_eq!(there.step(dir.opposite()), origin);
        }
    }

    #[test]
    fn test_villager_id_generation() {
        let id1 = VillagerId::new();
        let id2 = VillagerId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
    }

    #[test]
    fn test_direction_between_neighbours() {
        let a = GridCoord::new(2, 3);
        assert_eq!(a.direction_to(a.step(Direction::Up)), Direction::Up);
        assert_eq!(a.direction_to(GridCoord::new(9, 9)), Direction::None);
    }
}
