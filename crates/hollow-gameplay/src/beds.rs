//! Bed registry and exclusive sleep-spot assignment.
//!
//! Every registered bed is either available or occupied, never both. Villagers
//! acquire a bed when night falls and release it when they wake.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use hollow_common::{BedError, BedId, VillagerId};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// A place for one villager to sleep.
#[derive(Debug, Clone, PartialEq)]
pub struct Bed {
    id: BedId,
    sleep_position: Vec2,
    assigned: Option<VillagerId>,
}

impl Bed {
    /// Creates an unassigned bed.
    #[must_use]
    pub const fn new(id: BedId, sleep_position: Vec2) -> Self {
        Self {
            id,
            sleep_position,
            assigned: None,
        }
    }

    /// Bed identifier.
    #[must_use]
    pub const fn id(&self) -> BedId {
        self.id
    }

    /// Where a sleeper lies down.
    #[must_use]
    pub const fn sleep_position(&self) -> Vec2 {
        self.sleep_position
    }

    /// Current sleeper.
    #[must_use]
    pub const fn assigned(&self) -> Option<VillagerId> {
        self.assigned
    }

    /// Whether a villager is assigned.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.assigned.is_some()
    }

    /// Assigns `villager` to this bed.
    pub fn try_assign(&mut self, villager: VillagerId) -> Result<(), BedError> {
        if let Some(current) = self.assigned {
            return Err(BedError::AlreadyAssigned {
                bed: self.id,
                villager: current,
            });
        }
        self.assigned = Some(villager);
        Ok(())
    }

    /// Clears the assignment, returning the previous sleeper.
    pub fn release(&mut self) -> Option<VillagerId> {
        self.assigned.take()
    }
}

/// Registry of beds partitioned into available and occupied.
#[derive(Debug, Default)]
pub struct BedPool {
    beds: AHashMap<BedId, Bed>,
    available: VecDeque<BedId>,
    occupied: AHashSet<BedId>,
}

impl BedPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bed to the available set. Beds already tracked are ignored.
    ///
    /// Returns true if the bed was newly registered.
    pub fn register(&mut self, bed: Bed) -> bool {
        let id = bed.id();
        if self.beds.contains_key(&id) {
            return false;
        }
        self.beds.insert(id, Bed { assigned: None, ..bed });
        self.available.push_back(id);
        debug!("Registered {}", id);
        true
    }

    /// Removes a bed from both sets.
    pub fn unregister(&mut self, id: BedId) -> Option<Bed> {
        self.available.retain(|b| *b != id);
        self.occupied.remove(&id);
        let bed = self.beds.remove(&id);
        if bed.is_some() {
            debug!("Unregistered {}", id);
        }
        bed
    }

    /// Takes the first available bed and assigns it to `villager`.
    ///
    /// Returns `None` when every bed is taken.
    pub fn acquire(&mut self, villager: VillagerId) -> Option<BedId> {
        let id = self.available.pop_front()?;
        self.occupied.insert(id);
        if let Some(bed) = self.beds.get_mut(&id) {
            if let Err(e) = bed.try_assign(villager) {
                warn!("Inconsistent bed state: {e}");
            }
        }
        debug!("{} acquired {}", villager, id);
        Some(id)
    }

    /// Returns an occupied bed to the available set. No-op otherwise.
    ///
    /// Returns true if the bed was occupied.
    pub fn release(&mut self, id: BedId) -> bool {
        if !self.occupied.remove(&id) {
            if !self.beds.contains_key(&id) {
                warn!("Release of unknown {}", id);
            }
            return false;
        }
        if let Some(bed) = self.beds.get_mut(&id) {
            bed.release();
        }
        self.available.push_back(id);
        debug!("Released {}", id);
        true
    }

    /// Looks up a bed.
    #[must_use]
    pub fn get(&self, id: BedId) -> Option<&Bed> {
        self.beds.get(&id)
    }

    /// Sleep position of a registered bed.
    #[must_use]
    pub fn sleep_position(&self, id: BedId) -> Option<Vec2> {
        self.beds.get(&id).map(Bed::sleep_position)
    }

    /// Whether the bed is currently in the available set.
    #[must_use]
    pub fn is_available(&self, id: BedId) -> bool {
        self.beds.contains_key(&id) && !self.occupied.contains(&id)
    }

    /// Whether the bed is currently in the occupied set.
    #[must_use]
    pub fn is_occupied(&self, id: BedId) -> bool {
        self.occupied.contains(&id)
    }

    /// Number of available beds.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Number of occupied beds.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Number of registered beds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.beds.len()
    }

    /// Returns true if no beds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beds.is_empty()
    }
}

/// A bed pool shared between threads.
///
/// Both sets sit behind one lock, so an acquire is a single step with
/// respect to every other villager's acquire or release.
#[derive(Debug, Clone, Default)]
pub struct SharedBedPool(Arc<Mutex<BedPool>>);

impl SharedBedPool {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: BedPool) -> Self {
        Self(Arc::new(Mutex::new(pool)))
    }

    /// Locks the pool for a sequence of operations (for example a whole villager tick).
    pub fn lock(&self) -> MutexGuard<'_, BedPool> {
        self.0.lock()
    }

    /// Acquires a bed under the lock.
    pub fn acquire(&self, villager: VillagerId) -> Option<BedId> {
        self.0.lock().acquire(villager)
    }

    /// Releases a bed under the lock.
    pub fn release(&self, id: BedId) -> bool {
        self.0.lock().release(id)
    }
}
