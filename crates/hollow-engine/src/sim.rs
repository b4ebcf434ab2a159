//! Headless run: one dungeon plus a village ticking through the days.

use glam::Vec2;
use hollow_common::{BedId, Direction};
use hollow_gameplay::{
    instantiate_layout, AssetCatalog, Bed, BedPool, DayNightCycle, DungeonLayout,
    LayoutGenerator, LayoutIssue, OpenFieldNavigator, PlacedRoom, RoomInstantiator, RoomType,
    SharedBedPool, TickContext, TimeEvent, Villager, VillagerDebugInfo, VillagerState,
};
use tracing::{debug, info};

use crate::config::HollowConfig;

/// Villagers start on a ring of this radius around the origin.
const SPAWN_RING_RADIUS: f32 = 2.0;

/// Instantiator that resolves assets from a catalog and logs each placement.
pub struct CatalogInstantiator {
    catalog: AssetCatalog,
}

impl CatalogInstantiator {
    /// Wraps a catalog.
    #[must_use]
    pub fn new(catalog: AssetCatalog) -> Self {
        Self { catalog }
    }
}

impl RoomInstantiator for CatalogInstantiator {
    type Asset = String;
    type Instance = String;

    fn find_asset(&mut self, signature: &str, room_type: RoomType) -> Option<String> {
        self.catalog.pick(signature, room_type).map(str::to_string)
    }

    fn place_asset(&mut self, asset: String, world_pos: Vec2) -> String {
        debug!("Spawned '{}' at ({:.1}, {:.1})", asset, world_pos.x, world_pos.y);
        asset
    }
}

/// Catalog with two variants of every room type for every pathway combination.
#[must_use]
pub fn stock_catalog(rng: fastrand::Rng) -> AssetCatalog {
    let mut catalog = AssetCatalog::new(rng);
    for mask in 1_u8..16 {
        let signature: String = Direction::CARDINALS
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, dir)| dir.name())
            .collect();
        for room_type in [RoomType::Start, RoomType::Combat, RoomType::Boss] {
            let base = format!("{}_{}", room_type.display_name().to_lowercase(), signature);
            catalog.register(room_type, &signature, format!("{base}_a"));
            catalog.register(room_type, &signature, format!("{base}_b"));
        }
    }
    catalog
}

/// Generates the dungeon and places every room.
pub fn build_dungeon(config: &HollowConfig) -> (DungeonLayout, Vec<PlacedRoom<String>>) {
    let mut generator = LayoutGenerator::from_config(&config.layout);
    let layout = generator.generate(&config.layout);

    let asset_rng = config
        .rooms
        .asset_seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let mut instantiator = CatalogInstantiator::new(stock_catalog(asset_rng));
    let placed = instantiate_layout(&layout, &mut instantiator, config.rooms.spacing);
    (layout, placed)
}

struct Resident {
    villager: Villager,
    nav: OpenFieldNavigator,
    was_asleep: bool,
}

/// Villagers, beds and the clock they share.
pub struct Village {
    clock: DayNightCycle,
    beds: SharedBedPool,
    residents: Vec<Resident>,
    daily_prayer: bool,
    prayer_hour: u32,
    sleep_starts: u32,
}

impl Village {
    /// Builds the village described by `config`.
    #[must_use]
    pub fn new(config: &HollowConfig) -> Self {
        let village = &config.village;
        let mut rng = village
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut pool = BedPool::new();
        for i in 0..village.beds {
            let pos = village.bed_origin + Vec2::X * village.bed_spacing * i as f32;
            pool.register(Bed::new(BedId::new(i), pos));
        }

        let count = village.villagers.max(1) as f32;
        let residents = (0..village.villagers)
            .map(|i| {
                let angle = i as f32 / count * std::f32::consts::TAU;
                let spawn = Vec2::from_angle(angle) * SPAWN_RING_RADIUS;
                let nav = OpenFieldNavigator::new(
                    spawn,
                    Vec2::ZERO,
                    village.area_radius,
                    fastrand::Rng::with_seed(rng.u64(..)),
                )
                .with_speed(village.walk_speed);
                let villager = Villager::new(
                    config.villager.clone(),
                    fastrand::Rng::with_seed(rng.u64(..)),
                )
                .with_shrine(village.shrine);
                Resident {
                    villager,
                    nav,
                    was_asleep: false,
                }
            })
            .collect();

        let clock = DayNightCycle::starting_at(config.simulation.start_hour)
            .with_day_length(config.simulation.day_length_seconds);

        Self {
            clock,
            beds: SharedBedPool::new(pool),
            residents,
            daily_prayer: config.simulation.daily_prayer,
            prayer_hour: config.simulation.prayer_hour,
            sleep_starts: 0,
        }
    }

    /// Advances the clock, every navigator and every villager by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Option<TimeEvent> {
        let hour_before = self.clock.hour().floor() as u32;
        let event = self.clock.update(dt);
        let hour_after = self.clock.hour().floor() as u32;
        match event {
            Some(TimeEvent::HourChanged(_)) => debug!("{}", self.clock.format_time()),
            Some(e) => info!("{} ({})", e.description(), self.clock.format_time()),
            None => {},
        }
        let prayer_time =
            self.daily_prayer && hour_after != hour_before && hour_after == self.prayer_hour;

        let mut pool = self.beds.lock();
        for resident in &mut self.residents {
            resident.nav.step(dt);
            let mut ctx = TickContext::new(&mut resident.nav, &self.clock, &mut pool);
            if prayer_time {
                resident.villager.force_state(VillagerState::Praying, &mut ctx);
            }
            resident.villager.tick(dt, &mut ctx);

            let asleep = resident.villager.is_asleep();
            if asleep && !resident.was_asleep {
                self.sleep_starts += 1;
            }
            resident.was_asleep = asleep;
        }
        event
    }

    /// The shared clock.
    #[must_use]
    pub fn clock(&self) -> &DayNightCycle {
        &self.clock
    }

    /// The shared bed pool.
    #[must_use]
    pub fn beds(&self) -> &SharedBedPool {
        &self.beds
    }

    /// All villagers.
    pub fn villagers(&self) -> impl Iterator<Item = &Villager> + '_ {
        self.residents.iter().map(|r| &r.villager)
    }

    /// How many times any villager lay down to sleep.
    #[must_use]
    pub fn sleep_starts(&self) -> u32 {
        self.sleep_starts
    }

    /// Debug view of every villager.
    #[must_use]
    pub fn snapshots(&self) -> Vec<VillagerDebugInfo> {
        self.villagers()
            .map(|v| v.debug_snapshot(&self.clock))
            .collect()
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Rooms generated
    pub rooms: usize,
    /// Rooms on the main path
    pub main_path: usize,
    /// Branch rooms
    pub branches: usize,
    /// Whether the boss room was placed
    pub boss_placed: bool,
    /// Generation problems
    pub issues: Vec<LayoutIssue>,
    /// Rooms that found an asset and were placed
    pub placed_rooms: usize,
    /// Day counter at the end of the run
    pub final_day: u32,
    /// Times a villager lay down to sleep
    pub sleep_starts: u32,
    /// Villager states at the end of the run
    pub final_states: Vec<VillagerState>,
    /// Beds occupied at the end of the run
    pub beds_occupied: usize,
}

/// Generates a dungeon, then simulates the village for the configured ticks.
pub fn run(config: &HollowConfig) -> (RunSummary, Village) {
    let (layout, placed) = build_dungeon(config);
    info!(
        "Dungeon: {} rooms ({} main path, {} branches), {} placed",
        layout.len(),
        layout.main_path_ids().len(),
        layout.branches().count(),
        placed.len()
    );

    let mut village = Village::new(config);
    for _ in 0..config.simulation.ticks {
        village.step(config.simulation.tick_seconds);
    }

    let summary = RunSummary {
        rooms: layout.len(),
        main_path: layout.main_path_ids().len(),
        branches: layout.branches().count(),
        boss_placed: layout.boss().is_some(),
        issues: layout.issues().to_vec(),
        placed_rooms: placed.len(),
        final_day: village.clock().day(),
        sleep_starts: village.sleep_starts(),
        final_states: village.villagers().map(Villager::state).collect(),
        beds_occupied: village.beds().lock().occupied_count(),
    };
    (summary, village)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;
    use hollow_gameplay::{LayoutConfig, TargetKind};

    fn config() -> HollowConfig {
        let mut config = HollowConfig::default();
        config.layout = LayoutConfig::with_main_path(6).seed(21);
        config.rooms.asset_seed = Some(4);
        config.village.seed = Some(8);
        config
    }

    #[test]
    fn test_stock_catalog_covers_signatures() {
        let mut catalog = stock_catalog(fastrand::Rng::with_seed(1));
        assert_eq!(catalog.len(), 15 * 3 * 2);
        assert!(catalog.pick("UPDOWNLEFTRIGHT", RoomType::Boss).is_some());
        assert!(catalog.pick("DOWNUP", RoomType::Combat).is_none());
    }

    #[test]
    fn test_every_room_is_placed() {
        let (layout, placed) = build_dungeon(&config());
        assert_eq!(layout.main_path_ids().len(), 6);
        assert_eq!(placed.len(), layout.len());
        let boss = layout.boss().expect("boss room");
        let boss_placed = placed.iter().find(|p| p.room == boss.id()).expect("placed boss");
        assert!(boss_placed.instance.starts_with("boss_"));
        assert_eq!(boss_placed.world_pos, boss.coord().to_world(30.0));
    }

    #[test]
    fn test_night_fills_beds() {
        let mut config = config();
        config.simulation.start_hour = 21.5;
        let mut village = Village::new(&config);

        // 3.5 game hours at 0.01 hours per tick.
        for _ in 0..350 {
            village.step(0.1);
        }

        let pool = village.beds().lock();
        assert_eq!(pool.occupied_count(), 3);
        drop(pool);

        let beds: AHashSet<BedId> = village.villagers().filter_map(Villager::assigned_bed).collect();
        assert_eq!(beds.len(), 3);
        assert_eq!(village.villagers().filter(|v| v.is_asleep()).count(), 3);
        let homeless: Vec<&Villager> = village
            .villagers()
            .filter(|v| v.assigned_bed().is_none())
            .collect();
        assert_eq!(homeless.len(), 1);
        assert_eq!(homeless[0].state(), VillagerState::Idle);
    }

    #[test]
    fn test_daily_prayer_sends_villagers_to_shrine() {
        let mut config = config();
        config.simulation.start_hour = 11.5;
        let mut village = Village::new(&config);

        while village.clock().hour() < 12.0 {
            village.step(0.1);
        }
        for v in village.villagers() {
            assert_eq!(v.target_kind(), Some(TargetKind::Shrine));
            assert_eq!(v.state(), VillagerState::Walking);
        }
    }

    #[test]
    fn test_full_run() {
        let (summary, village) = run(&config());
        assert_eq!(summary.main_path, 6);
        assert_eq!(summary.placed_rooms, summary.rooms);
        assert!(summary.boss_placed);
        assert!(summary.issues.is_empty());
        assert!(summary.final_day >= 3);
        assert!(summary.sleep_starts >= 3);
        assert_eq!(summary.final_states.len(), 4);
        assert_eq!(village.snapshots().len(), 4);
    }
}
