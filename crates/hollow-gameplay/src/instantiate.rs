//! Boundary between generated layouts and whatever renders rooms.
//!
//! The generator only produces topology. A [`RoomInstantiator`] picks a
//! concrete asset for each room from its layout signature and type, then
//! places it in world space. [`AssetCatalog`] is an in-memory asset source
//! that instantiators can delegate the lookup to.

use ahash::AHashMap;
use glam::Vec2;
use hollow_common::RoomId;
use tracing::{debug, warn};

use crate::layout::DungeonLayout;
use crate::room::RoomType;

/// Default world distance between neighbouring room cells.
pub const DEFAULT_ROOM_SPACING: f32 = 30.0;

/// Renders or spawns rooms for a layout.
pub trait RoomInstantiator {
    /// Handle to a room asset (prefab, scene, tile chunk).
    type Asset;
    /// Handle to a placed room.
    type Instance;

    /// Finds an asset whose pathways match `signature` for a room of `room_type`.
    fn find_asset(&mut self, signature: &str, room_type: RoomType) -> Option<Self::Asset>;

    /// Places `asset` centred on `world_pos`.
    fn place_asset(&mut self, asset: Self::Asset, world_pos: Vec2) -> Self::Instance;
}

/// A room that was placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRoom<I> {
    /// Source room
    pub room: RoomId,
    /// World position the room was placed at
    pub world_pos: Vec2,
    /// Instantiator's handle
    pub instance: I,
}

/// Places every room of `layout`, `spacing` world units apart.
///
/// Rooms with no matching asset are logged and skipped.
pub fn instantiate_layout<R: RoomInstantiator>(
    layout: &DungeonLayout,
    instantiator: &mut R,
    spacing: f32,
) -> Vec<PlacedRoom<R::Instance>> {
    let mut placed = Vec::with_capacity(layout.len());
    for room in layout.rooms() {
        let signature = room.layout_signature();
        let Some(asset) = instantiator.find_asset(&signature, room.room_type()) else {
            warn!(
                "No {} asset matches signature '{}' for {}",
                room.room_type().display_name(),
                signature,
                room.id()
            );
            continue;
        };
        let world_pos = room.coord().to_world(spacing);
        let instance = instantiator.place_asset(asset, world_pos);
        debug!("Placed {} at ({}, {})", room.id(), world_pos.x, world_pos.y);
        placed.push(PlacedRoom {
            room: room.id(),
            world_pos,
            instance,
        });
    }
    placed
}

/// Asset names grouped by room type and layout signature.
#[derive(Debug)]
pub struct AssetCatalog {
    assets: AHashMap<(RoomType, String), Vec<String>>,
    rng: fastrand::Rng,
}

impl AssetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            assets: AHashMap::new(),
            rng,
        }
    }

    /// Registers an asset for rooms of `room_type` with `signature`.
    pub fn register(&mut self, room_type: RoomType, signature: &str, asset: impl Into<String>) {
        self.assets
            .entry((room_type, signature.to_string()))
            .or_default()
            .push(asset.into());
    }

    /// Number of registered assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Returns true if no assets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Picks one of the matching assets at random.
    pub fn pick(&mut self, signature: &str, room_type: RoomType) -> Option<&str> {
        let candidates = self.assets.get(&(room_type, signature.to_string()))?;
        if candidates.is_empty() {
            return None;
        }
        let index = self.rng.usize(..candidates.len());
        candidates.get(index).map(String::as_str)
    }
}
