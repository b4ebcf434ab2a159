//! Runner configuration.
//!
//! Settings for dungeon generation, the village and the simulation loop.
//! Configuration can be loaded from and saved to a TOML file.

use glam::Vec2;
use hollow_common::{ConfigError, HollowResult};
use hollow_gameplay::{LayoutConfig, VillagerConfig, BRANCH_ROLL_RANGE, DEFAULT_ROOM_SPACING};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "hollow.toml";

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HollowConfig {
    /// Dungeon generation
    pub layout: LayoutConfig,
    /// World placement of generated rooms
    pub rooms: RoomPlacementConfig,
    /// Village population and beds
    pub village: VillageConfig,
    /// Villager behaviour tuning
    pub villager: VillagerConfig,
    /// Simulation loop
    pub simulation: SimulationConfig,
}

/// World placement of rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomPlacementConfig {
    /// World units between neighbouring room cells
    pub spacing: f32,
    /// Seed for picking among matching room assets (None = random)
    pub asset_seed: Option<u64>,
}

impl Default for RoomPlacementConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_ROOM_SPACING,
            asset_seed: None,
        }
    }
}

/// Village layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageConfig {
    /// Number of villagers
    pub villagers: u32,
    /// Number of beds
    pub beds: u32,
    /// Position of the first bed
    pub bed_origin: Vec2,
    /// Distance between beds, laid out in a row
    pub bed_spacing: f32,
    /// Shrine position
    pub shrine: Vec2,
    /// Radius of the walkable area around the origin
    pub area_radius: f32,
    /// Villager walking speed
    pub walk_speed: f32,
    /// Seed for villager behaviour (None = random)
    pub seed: Option<u64>,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            villagers: 4,
            beds: 3,
            bed_origin: Vec2::new(-4.0, 6.0),
            bed_spacing: 2.0,
            shrine: Vec2::new(0.0, -8.0),
            area_radius: 20.0,
            walk_speed: 2.0,
            seed: None,
        }
    }
}

/// Simulation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run
    pub ticks: u32,
    /// Seconds per tick
    pub tick_seconds: f32,
    /// Real seconds per game day
    pub day_length_seconds: f32,
    /// Hour the clock starts at
    pub start_hour: f32,
    /// Send every villager to the shrine once a day
    pub daily_prayer: bool,
    /// Hour at which villagers are sent to pray
    pub prayer_hour: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 6_000,
            tick_seconds: 0.1,
            day_length_seconds: 240.0,
            start_hour: 20.0,
            daily_prayer: true,
            prayer_hour: 12,
        }
    }
}

impl HollowConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            },
        }
    }

    /// Load configuration, failing on unreadable or invalid files.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> HollowResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> HollowResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Rejects values that clamping cannot repair.
    pub fn check(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !sim.tick_seconds.is_finite() || sim.tick_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "simulation.tick_seconds",
                reason: format!("must be a positive number, got {}", sim.tick_seconds),
            });
        }
        if !sim.start_hour.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "simulation.start_hour",
                reason: "must be finite".to_string(),
            });
        }
        let v = &self.villager;
        if v.idle_duration_min > v.idle_duration_max {
            return Err(ConfigError::InvalidValue {
                field: "villager.idle_duration_min",
                reason: format!(
                    "{} exceeds idle_duration_max {}",
                    v.idle_duration_min, v.idle_duration_max
                ),
            });
        }
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Layout
        self.layout.main_path_length = self.layout.main_path_length.clamp(1, 256);
        self.layout.branch_chance = self.layout.branch_chance.min(BRANCH_ROLL_RANGE);
        self.rooms.spacing = self.rooms.spacing.clamp(1.0, 1_000.0);

        // Village
        self.village.villagers = self.village.villagers.min(256);
        self.village.beds = self.village.beds.min(256);
        self.village.area_radius = self.village.area_radius.clamp(1.0, 500.0);
        self.village.walk_speed = self.village.walk_speed.clamp(0.1, 50.0);
        self.village.bed_spacing = self.village.bed_spacing.max(0.0);

        // Villager
        self.villager.wander_radius = self.villager.wander_radius.max(0.0);
        self.villager.bed_proximity = self.villager.bed_proximity.max(0.1);
        self.villager.shrine_proximity = self.villager.shrine_proximity.max(0.1);
        self.villager.prayer_duration_hours = self.villager.prayer_duration_hours.clamp(0.0, 23.0);
        self.villager.schedule.sleep_hour = self.villager.schedule.sleep_hour.clamp(0.0, 24.0);
        self.villager.schedule.wake_hour = self.villager.schedule.wake_hour.clamp(0.0, 24.0);

        // Simulation
        self.simulation.tick_seconds = self.simulation.tick_seconds.clamp(0.001, 10.0);
        self.simulation.day_length_seconds = self.simulation.day_length_seconds.max(1.0);
        self.simulation.prayer_hour = self.simulation.prayer_hour.min(23);
    }
}
