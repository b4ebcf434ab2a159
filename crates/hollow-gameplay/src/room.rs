//! Dungeon room records and pathway bookkeeping.

use hollow_common::{Direction, GridCoord, RoomId};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Role a room plays in the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Entry room at the grid origin
    Start,
    /// Regular fight room (main path filler and branches)
    Combat,
    /// Final room at the end of the main path
    Boss,
}

impl RoomType {
    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Combat => "Combat",
            Self::Boss => "Boss",
        }
    }
}

/// One recorded pathway from a room to a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Room on the other side of the pathway
    pub neighbor: RoomId,
    /// Direction of the pathway, seen from the owning room
    pub direction: Direction,
}

/// A single node of a generated dungeon layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRecord {
    id: RoomId,
    coord: GridCoord,
    is_main_path: bool,
    room_type: RoomType,
    cleared: bool,
    connections: Vec<Connection>,
}

impl RoomRecord {
    /// Creates an unconnected, uncleared room.
    #[must_use]
    pub fn new(id: RoomId, is_main_path: bool, coord: GridCoord, room_type: RoomType) -> Self {
        Self {
            id,
            coord,
            is_main_path,
            room_type,
            cleared: false,
            connections: Vec::new(),
        }
    }

    /// Room identifier.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Grid cell occupied by this room.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Whether the room lies on the start-to-boss path.
    #[must_use]
    pub const fn is_main_path(&self) -> bool {
        self.is_main_path
    }

    /// Role of the room.
    #[must_use]
    pub const fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Whether the player has cleared this room.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Marks the room as cleared.
    pub fn mark_cleared(&mut self) {
        self.cleared = true;
    }

    /// Recorded pathways in insertion order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of pathways (graph degree).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.connections.len()
    }

    /// Records a one-sided pathway to `other`.
    ///
    /// The caller must record the reciprocal pathway on `other` with
    /// `direction.opposite()`. `Direction::None` is logged and still stored.
    /// Returns false if the direction was `None`.
    pub fn connect_to(&mut self, other: RoomId, direction: Direction) -> bool {
        if !direction.is_cardinal() {
            error!("{} recorded a pathway to {} with direction NONE", self.id, other);
        }
        self.connections.push(Connection {
            neighbor: other,
            direction,
        });
        direction.is_cardinal()
    }

    /// Neighbour reached through the pathway in `direction`, if any.
    #[must_use]
    pub fn neighbor_in(&self, direction: Direction) -> Option<RoomId> {
        self.connections
            .iter()
            .find(|c| c.direction == direction)
            .map(|c| c.neighbor)
    }

    /// Direction of the pathway leading to `other`, if connected.
    #[must_use]
    pub fn direction_to(&self, other: RoomId) -> Option<Direction> {
        self.connections
            .iter()
            .find(|c| c.neighbor == other)
            .map(|c| c.direction)
    }

    /// Canonical key built from the set of pathway directions.
    ///
    /// Directions are sorted by enum order and their names concatenated, so
    /// the key does not depend on insertion order or neighbour identity. Used
    /// to look up a matching room asset.
    #[must_use]
    pub fn layout_signature(&self) -> String {
        let mut directions: Vec<Direction> =
            self.connections.iter().map(|c| c.direction).collect();
        directions.sort_unstable();
        directions.iter().map(|d| d.name()).collect()
    }
}

/// Connects two rooms in both directions. `direction` is the pathway as seen
/// from `a`; `b` receives the opposite.
pub fn connect_rooms(a: &mut RoomRecord, b: &mut RoomRecord, direction: Direction) {
    a.connect_to(b.id(), direction);
    b.connect_to(a.id(), direction.opposite());
}
