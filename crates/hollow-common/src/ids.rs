//! ID types for rooms, beds and villagers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for villager IDs.
static VILLAGER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of a generated room. Assigned sequentially from 0 per layout,
/// so it doubles as the room's index in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a room ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position of the room in its layout's room list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Identifier of a bed registered with a bed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BedId(u32);

impl BedId {
    /// Creates a bed ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bed#{}", self.0)
    }
}

/// Unique identifier for a villager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillagerId(u64);

impl VillagerId {
    /// Creates a new unique villager ID.
    #[must_use]
    pub fn new() -> Self {
        Self(VILLAGER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a villager ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid villager ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) villager ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for VillagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VillagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "villager#{}", self.0)
    }
}
