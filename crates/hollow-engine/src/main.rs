//! # Hollow
//!
//! Headless runner for the Hollow village sim.
//!
//! Generates one dungeon layout, places its rooms through the asset catalog,
//! then runs the village (villagers, beds, day/night clock) for a fixed number
//! of ticks and logs what happened.
//!
//! Usage: `hollow [config.toml]` (defaults to `hollow.toml`).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod sim;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{HollowConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hollow=info".parse()?))
        .init();

    info!("Hollow starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let mut config = HollowConfig::load_from(&path);
    if !std::path::Path::new(&path).exists() {
        config.save_to(&path)?;
    }
    config.validate();
    config.check()?;

    let (summary, village) = sim::run(&config);

    info!(
        "Layout: {} rooms, {} on main path, {} branches, boss placed: {}",
        summary.rooms, summary.main_path, summary.branches, summary.boss_placed
    );
    for issue in &summary.issues {
        info!("Layout issue: {issue}");
    }
    info!("Placed {} of {} rooms", summary.placed_rooms, summary.rooms);
    info!(
        "Village ran to day {} at {}: {} sleeps, {} beds occupied",
        summary.final_day,
        village.clock().format_time(),
        summary.sleep_starts,
        summary.beds_occupied
    );
    info!("Final villager states: {:?}", summary.final_states);
    for snapshot in village.snapshots() {
        info!("{}\n{}", snapshot.id, snapshot);
    }

    info!("Hollow shutdown complete");
    Ok(())
}
