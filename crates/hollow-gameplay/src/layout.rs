//! Procedural dungeon layout generation.
//!
//! A layout is a set of rooms on an integer grid:
//! - A main path from the start room at the origin to a boss room, grown as a
//!   randomized self-avoiding walk
//! - Optional single-room branches hanging off main-path rooms
//!
//! Generation never fails. Anything that goes wrong (a walk that boxes itself
//! in, a boss room with nowhere to go) is logged and reported as a
//! [`LayoutIssue`] on the returned [`DungeonLayout`].

use ahash::AHashSet;
use hollow_common::{Direction, GridCoord, RoomId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::room::{connect_rooms, RoomRecord, RoomType};

/// Branch rolls are out of this many.
pub const BRANCH_ROLL_RANGE: u32 = 10_000;

/// Default branch chance (30%).
pub const DEFAULT_BRANCH_CHANCE: u32 = 3_000;

/// Generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Requested number of main-path rooms, start and boss included
    pub main_path_length: u32,
    /// Chance out of 10000 that a main-path room grows a branch
    pub branch_chance: u32,
    /// Reserved for multi-room branches; not used by the generator yet
    pub max_branch_length: u32,
    /// Seed for the generator's RNG (None = random)
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            main_path_length: 8,
            branch_chance: DEFAULT_BRANCH_CHANCE,
            max_branch_length: 2,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Creates a config with the given main-path length and default branching.
    #[must_use]
    pub fn with_main_path(main_path_length: u32) -> Self {
        Self {
            main_path_length,
            ..Self::default()
        }
    }

    /// Sets the branch chance (out of 10000, clamped).
    #[must_use]
    pub fn branch_chance(mut self, chance: u32) -> Self {
        self.branch_chance = chance.min(BRANCH_ROLL_RANGE);
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Something that went wrong during generation. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LayoutIssue {
    /// Main path length below 2
    #[error("main path length {requested} is below 2; layout is degenerate")]
    DegenerateMainPath {
        /// Requested length
        requested: u32,
    },
    /// The walk boxed itself in before reaching the requested length
    #[error("main path truncated: requested {requested} rooms, built {built}")]
    MainPathTruncated {
        /// Requested length
        requested: u32,
        /// Rooms actually placed before the boss search
        built: u32,
    },
    /// No free neighbour for the boss room
    #[error("no free cell next to {last} for the boss room")]
    BossRoomMissing {
        /// Last main-path room
        last: RoomId,
    },
    /// A pathway was recorded with `Direction::None`
    #[error("{room} has a pathway with direction NONE")]
    InvalidConnection {
        /// Room holding the bad pathway
        room: RoomId,
    },
}

/// Result of one generator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonLayout {
    rooms: Vec<RoomRecord>,
    main_path: Vec<RoomId>,
    boss: Option<RoomId>,
    issues: Vec<LayoutIssue>,
}

impl DungeonLayout {
    /// All rooms, indexed by id.
    #[must_use]
    pub fn rooms(&self) -> &[RoomRecord] {
        &self.rooms
    }

    /// Number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns true if no rooms were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Looks up a room by id.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&RoomRecord> {
        self.rooms.get(id.index())
    }

    /// Ids of the main path, start first.
    #[must_use]
    pub fn main_path_ids(&self) -> &[RoomId] {
        &self.main_path
    }

    /// Main-path rooms, start first.
    pub fn main_path(&self) -> impl Iterator<Item = &RoomRecord> + '_ {
        self.main_path.iter().filter_map(|id| self.room(*id))
    }

    /// Rooms hanging off the main path.
    pub fn branches(&self) -> impl Iterator<Item = &RoomRecord> + '_ {
        self.rooms.iter().filter(|r| !r.is_main_path())
    }

    /// The start room.
    #[must_use]
    pub fn start(&self) -> Option<&RoomRecord> {
        self.rooms.first()
    }

    /// The boss room, if one could be placed.
    #[must_use]
    pub fn boss(&self) -> Option<&RoomRecord> {
        self.boss.and_then(|id| self.room(id))
    }

    /// Room reached from `from` through its pathway in `direction`.
    #[must_use]
    pub fn neighbor(&self, from: RoomId, direction: Direction) -> Option<&RoomRecord> {
        self.room(from)
            .and_then(|r| r.neighbor_in(direction))
            .and_then(|id| self.room(id))
    }

    /// Marks a room as cleared. Returns false for unknown ids.
    pub fn mark_cleared(&mut self, id: RoomId) -> bool {
        match self.rooms.get_mut(id.index()) {
            Some(room) => {
                room.mark_cleared();
                true
            },
            None => false,
        }
    }

    /// Problems encountered while generating.
    #[must_use]
    pub fn issues(&self) -> &[LayoutIssue] {
        &self.issues
    }

    /// True if the requested main path and the boss room were both placed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.boss.is_some()
            && !self.issues.iter().any(|i| {
                matches!(
                    i,
                    LayoutIssue::MainPathTruncated { .. } | LayoutIssue::BossRoomMissing { .. }
                )
            })
    }
}

/// Dungeon layout generator.
///
/// Holds the transient build state of a run; [`LayoutGenerator::generate`]
/// resets it on entry, so one generator can be reused for many layouts.
#[derive(Debug)]
pub struct LayoutGenerator {
    rng: fastrand::Rng,
    occupied: AHashSet<GridCoord>,
    rooms: Vec<RoomRecord>,
    main_path: Vec<RoomId>,
    next_id: u32,
    issues: Vec<LayoutIssue>,
}

impl LayoutGenerator {
    /// Creates a generator with an explicit RNG.
    #[must_use]
    pub fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            occupied: AHashSet::new(),
            rooms: Vec::new(),
            main_path: Vec::new(),
            next_id: 0,
            issues: Vec::new(),
        }
    }

    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    /// Creates a generator from the config's seed, or a random one.
    #[must_use]
    pub fn from_config(config: &LayoutConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::with_rng(fastrand::Rng::new()),
        }
    }

    /// Runs one generation pass.
    ///
    /// The generator's RNG carries over between calls; re-seed with
    /// [`LayoutGenerator::reseed`] to reproduce a layout.
    pub fn generate(&mut self, config: &LayoutConfig) -> DungeonLayout {
        self.reset();

        if config.main_path_length < 2 {
            warn!(
                "Main path length {} is below 2, generating degenerate layout",
                config.main_path_length
            );
            self.issues.push(LayoutIssue::DegenerateMainPath {
                requested: config.main_path_length,
            });
        }

        let boss = self.spawn_main_path(config.main_path_length);
        self.spawn_branches(config.branch_chance);
        self.collect_invalid_connections();

        let layout = DungeonLayout {
            rooms: std::mem::take(&mut self.rooms),
            main_path: std::mem::take(&mut self.main_path),
            boss,
            issues: std::mem::take(&mut self.issues),
        };
        info!(
            "Generated dungeon: {} rooms, {} on main path, boss {}",
            layout.len(),
            layout.main_path_ids().len(),
            if layout.boss.is_some() { "placed" } else { "missing" }
        );
        layout
    }

    /// Replaces the RNG state.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    fn reset(&mut self) {
        self.occupied.clear();
        self.rooms.clear();
        self.main_path.clear();
        self.next_id = 0;
        self.issues.clear();
    }

    /// Builds start, filler and boss rooms. Returns the boss id if placed.
    fn spawn_main_path(&mut self, main_path_length: u32) -> Option<RoomId> {
        let start = self.create_room(true, GridCoord::ORIGIN, RoomType::Start);
        self.main_path.push(start);

        let mut previous = start;
        let fillers = main_path_length.saturating_sub(2);
        for _ in 0..fillers {
            let Some((coord, dir)) = self.empty_neighbor(self.coord_of(previous)) else {
                let built = self.main_path.len() as u32;
                warn!(
                    "Main path boxed in after {} rooms (requested {})",
                    built, main_path_length
                );
                self.issues.push(LayoutIssue::MainPathTruncated {
                    requested: main_path_length,
                    built,
                });
                break;
            };
            let next = self.create_room(true, coord, RoomType::Combat);
            self.link(previous, next, dir);
            self.main_path.push(next);
            previous = next;
        }

        let Some((coord, dir)) = self.empty_neighbor(self.coord_of(previous)) else {
            error!("No free cell for the boss room next to {}", previous);
            self.issues.push(LayoutIssue::BossRoomMissing { last: previous });
            return None;
        };
        let boss = self.create_room(true, coord, RoomType::Boss);
        self.link(previous, boss, dir);
        self.main_path.push(boss);
        Some(boss)
    }

    /// Gives each main-path room one chance to grow a single branch room.
    fn spawn_branches(&mut self, branch_chance: u32) {
        let snapshot = self.main_path.clone();
        for node in snapshot {
            let roll = self.rng.u32(0..BRANCH_ROLL_RANGE);
            if roll >= branch_chance {
                continue;
            }
            let Some((coord, dir)) = self.empty_neighbor(self.coord_of(node)) else {
                debug!("No room to branch off {}", node);
                continue;
            };
            let branch = self.create_room(false, coord, RoomType::Combat);
            self.link(node, branch, dir);
            debug!("Branched {} off {} going {}", branch, node, dir);
        }
    }

    fn create_room(&mut self, is_main_path: bool, coord: GridCoord, room_type: RoomType) -> RoomId {
        let id = RoomId::new(self.next_id);
        self.next_id += 1;
        self.occupied.insert(coord);
        self.rooms
            .push(RoomRecord::new(id, is_main_path, coord, room_type));
        id
    }

    /// Connects `from` to `to`, where `to` lies in `dir` from `from`.
    fn link(&mut self, from: RoomId, to: RoomId, dir: Direction) {
        debug_assert!(from.index() < to.index());
        let (head, tail) = self.rooms.split_at_mut(to.index());
        if let (Some(a), Some(b)) = (head.get_mut(from.index()), tail.first_mut()) {
            connect_rooms(a, b, dir);
        }
    }

    fn coord_of(&self, id: RoomId) -> GridCoord {
        self.rooms
            .get(id.index())
            .map_or(GridCoord::ORIGIN, RoomRecord::coord)
    }

    /// First unoccupied neighbour of `pos` in a freshly shuffled direction order.
    fn empty_neighbor(&mut self, pos: GridCoord) -> Option<(GridCoord, Direction)> {
        let mut directions = Direction::CARDINALS;
        self.rng.shuffle(&mut directions);
        directions
            .into_iter()
            .map(|dir| (pos.step(dir), dir))
            .find(|(coord, _)| !self.occupied.contains(coord))
    }

    fn collect_invalid_connections(&mut self) {
        let bad: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|r| r.connections().iter().any(|c| !c.direction.is_cardinal()))
            .map(RoomRecord::id)
            .collect();
        self.issues
            .extend(bad.into_iter().map(|room| LayoutIssue::InvalidConnection { room }));
    }
}

/// Convenience wrapper: builds a generator from `config` and runs it once.
#[must_use]
pub fn generate(config: &LayoutConfig) -> DungeonLayout {
    LayoutGenerator::from_config(config).generate(config)
}
