//! Villager behaviour state machine.
//!
//! A villager idles, wanders, sleeps in a bed from the shared [`BedPool`] at
//! night, and prays at a shrine. Everything it touches in the world (movement,
//! time of day, beds) is passed in per tick through a [`TickContext`].

use std::fmt;

use glam::Vec2;
use hollow_common::{BedId, VillagerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::beds::BedPool;
use crate::navigation::Navigator;
use crate::time::{Clock, SleepSchedule, HOURS_PER_DAY};

/// Behaviour states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VillagerState {
    /// Standing around between activities
    #[default]
    Idle,
    /// Moving towards a target
    Walking,
    /// Asleep in an assigned bed
    Sleeping,
    /// Praying at the shrine
    Praying,
    /// Eating (not yet implemented)
    Eating,
    /// Building (not yet implemented)
    Build,
}

impl VillagerState {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Sleeping => "Sleeping",
            Self::Praying => "Praying",
            Self::Eating => "Eating",
            Self::Build => "Build",
        }
    }

    /// States in which an assigned bed is kept.
    #[must_use]
    pub const fn keeps_bed(self) -> bool {
        matches!(self, Self::Walking | Self::Sleeping)
    }
}

impl fmt::Display for VillagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a walk is heading for. Decides the state entered on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Random point near the villager
    Wander,
    /// The assigned bed
    Bed,
    /// The shrine
    Shrine,
}

/// Tuning for villager behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillagerConfig {
    /// Shortest idle pause in seconds
    pub idle_duration_min: f32,
    /// Longest idle pause in seconds
    pub idle_duration_max: f32,
    /// Radius for picking wander points
    pub wander_radius: f32,
    /// Distance at which the villager counts as at its bed
    pub bed_proximity: f32,
    /// Distance at which the villager counts as at the shrine
    pub shrine_proximity: f32,
    /// Length of a prayer in game hours
    pub prayer_duration_hours: f32,
    /// When to go to bed and get up
    pub schedule: SleepSchedule,
}

impl Default for VillagerConfig {
    fn default() -> Self {
        Self {
            idle_duration_min: 2.0,
            idle_duration_max: 4.0,
            wander_radius: 5.0,
            bed_proximity: 1.5,
            shrine_proximity: 1.5,
            prayer_duration_hours: 1.0,
            schedule: SleepSchedule::default(),
        }
    }
}

/// World access for one tick.
pub struct TickContext<'a, N: Navigator + ?Sized, C: Clock + ?Sized> {
    /// The villager's navigation agent
    pub nav: &'a mut N,
    /// Time of day
    pub clock: &'a C,
    /// Shared beds
    pub beds: &'a mut BedPool,
}

impl<'a, N: Navigator + ?Sized, C: Clock + ?Sized> TickContext<'a, N, C> {
    /// Bundles the collaborators for a tick.
    pub fn new(nav: &'a mut N, clock: &'a C, beds: &'a mut BedPool) -> Self {
        Self { nav, clock, beds }
    }
}

/// Read-only view of a villager for debug overlays and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VillagerDebugInfo {
    /// Villager
    pub id: VillagerId,
    /// Current state
    pub state: VillagerState,
    /// Seconds spent in the current state
    pub state_timer: f32,
    /// Clock hour at snapshot time
    pub game_hour: f32,
    /// Current walk target
    pub destination: Option<Vec2>,
    /// Assigned bed
    pub bed: Option<BedId>,
}

impl fmt::Display for VillagerDebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Game Hour: {:.2}", self.game_hour)?;
        match self.destination {
            Some(d) => writeln!(f, "Destination: ({:.2}, {:.2})", d.x, d.y),
            None => writeln!(f, "Destination: none"),
        }
    }
}

/// A villager driven by [`Villager::tick`].
#[derive(Debug)]
pub struct Villager {
    id: VillagerId,
    config: VillagerConfig,
    rng: fastrand::Rng,
    shrine: Option<Vec2>,
    state: VillagerState,
    state_timer: f32,
    idle_duration: f32,
    assigned_bed: Option<BedId>,
    current_target: Option<Vec2>,
    target_kind: Option<TargetKind>,
    asleep: bool,
    prayer_started_at: Option<f32>,
    bed_search_failed: bool,
}

impl Villager {
    /// Creates an idle villager.
    #[must_use]
    pub fn new(config: VillagerConfig, rng: fastrand::Rng) -> Self {
        let mut villager = Self {
            id: VillagerId::new(),
            config,
            rng,
            shrine: None,
            state: VillagerState::Idle,
            state_timer: 0.0,
            idle_duration: 0.0,
            assigned_bed: None,
            current_target: None,
            target_kind: None,
            asleep: false,
            prayer_started_at: None,
            bed_search_failed: false,
        };
        villager.idle_duration = villager.sample_idle_duration();
        villager
    }

    /// Sets the shrine this villager prays at.
    #[must_use]
    pub fn with_shrine(mut self, shrine: Vec2) -> Self {
        self.shrine = Some(shrine);
        self
    }

    /// Villager id.
    #[must_use]
    pub const fn id(&self) -> VillagerId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> VillagerState {
        self.state
    }

    /// Seconds spent in the current state.
    #[must_use]
    pub const fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Bed held by this villager.
    #[must_use]
    pub const fn assigned_bed(&self) -> Option<BedId> {
        self.assigned_bed
    }

    /// Point the villager is walking to.
    #[must_use]
    pub const fn current_target(&self) -> Option<Vec2> {
        self.current_target
    }

    /// Kind of the current target.
    #[must_use]
    pub const fn target_kind(&self) -> Option<TargetKind> {
        self.target_kind
    }

    /// True once the villager has lain down in its bed.
    #[must_use]
    pub const fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Behaviour settings.
    #[must_use]
    pub const fn config(&self) -> &VillagerConfig {
        &self.config
    }

    /// Shrine position.
    #[must_use]
    pub const fn shrine(&self) -> Option<Vec2> {
        self.shrine
    }

    /// Sets or clears the shrine.
    pub fn set_shrine(&mut self, shrine: Option<Vec2>) {
        self.shrine = shrine;
    }

    /// Snapshot for debug display.
    #[must_use]
    pub fn debug_snapshot(&self, clock: &(impl Clock + ?Sized)) -> VillagerDebugInfo {
        VillagerDebugInfo {
            id: self.id,
            state: self.state,
            state_timer: self.state_timer,
            game_hour: clock.current_hour(),
            destination: self.current_target,
            bed: self.assigned_bed,
        }
    }

    /// Advances the villager by `dt` seconds.
    pub fn tick<N, C>(&mut self, dt: f32, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        self.state_timer += dt.max(0.0);
        match self.state {
            VillagerState::Idle => self.update_idle(ctx),
            VillagerState::Walking => self.update_walking(ctx),
            VillagerState::Sleeping => self.update_sleeping(ctx),
            VillagerState::Praying => self.update_praying(ctx),
            VillagerState::Eating | VillagerState::Build => {
                self.change_state(VillagerState::Idle, ctx);
            },
        }
    }

    /// Switches state from outside, running the usual exit and enter actions.
    pub fn force_state<N, C>(&mut self, next: VillagerState, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        info!("{} forced into {}", self.id, next);
        self.change_state(next, ctx);
    }

    fn change_state<N, C>(&mut self, next: VillagerState, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        debug!("{}: {} -> {}", self.id, self.state, next);
        self.exit();
        if !next.keeps_bed() {
            self.release_bed(ctx);
        }
        self.state = next;
        self.state_timer = 0.0;
        self.enter(ctx);
    }

    fn enter<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        match self.state {
            VillagerState::Idle => {
                ctx.nav.stop();
                self.current_target = None;
                self.target_kind = None;
                self.bed_search_failed = false;
                self.idle_duration = self.sample_idle_duration();
            },
            VillagerState::Walking => ctx.nav.resume(),
            VillagerState::Sleeping => self.settle_in_bed(ctx),
            VillagerState::Praying => {
                if self.shrine.is_none() {
                    warn!("{} has no shrine to pray at", self.id);
                    self.change_state(VillagerState::Idle, ctx);
                } else {
                    self.begin_prayer(ctx);
                }
            },
            VillagerState::Eating | VillagerState::Build => {},
        }
    }

    fn exit(&mut self) {
        match self.state {
            VillagerState::Sleeping => {
                if self.asleep {
                    info!("{} woke up", self.id);
                }
                self.asleep = false;
            },
            VillagerState::Praying => self.prayer_started_at = None,
            _ => {},
        }
    }

    fn update_idle<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        let hour = ctx.clock.current_hour();
        if self.config.schedule.is_sleep_time(hour) {
            if self.assigned_bed.is_none() && !self.bed_search_failed {
                self.try_acquire_bed(ctx);
            }
            if let Some(pos) = self.bed_position(ctx) {
                if ctx.nav.set_destination(pos) {
                    self.set_target(pos, TargetKind::Bed);
                    self.change_state(VillagerState::Walking, ctx);
                    return;
                }
            }
            // No bed, or unreachable: try again after the idle pause.
            if self.state_timer >= self.idle_duration {
                self.change_state(VillagerState::Idle, ctx);
            }
            return;
        }

        if self.assigned_bed.is_some() {
            self.release_bed(ctx);
        }
        if self.state_timer < self.idle_duration {
            return;
        }
        let center = ctx.nav.position();
        match ctx.nav.sample_reachable_point(center, self.config.wander_radius) {
            None => self.change_state(VillagerState::Idle, ctx),
            Some(point) if ctx.nav.set_destination(point) => {
                self.set_target(point, TargetKind::Wander);
                self.change_state(VillagerState::Walking, ctx);
            },
            Some(_) => {
                debug!("{} could not path to wander point", self.id);
                self.state_timer = 0.0;
                self.idle_duration = self.sample_idle_duration();
            },
        }
    }

    fn update_walking<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        let hour = ctx.clock.current_hour();
        let schedule = self.config.schedule;
        let to_bed = self.target_kind == Some(TargetKind::Bed);

        if to_bed && schedule.is_wake_time(hour) {
            self.change_state(VillagerState::Idle, ctx);
            return;
        }
        if !to_bed && schedule.is_sleep_time(hour) {
            self.change_state(VillagerState::Sleeping, ctx);
            return;
        }
        if !ctx.nav.has_arrived() {
            return;
        }
        let next = match self.target_kind {
            Some(TargetKind::Bed) => VillagerState::Sleeping,
            Some(TargetKind::Shrine) => VillagerState::Praying,
            Some(TargetKind::Wander) | None => VillagerState::Idle,
        };
        self.change_state(next, ctx);
    }

    fn update_sleeping<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        if self.config.schedule.is_wake_time(ctx.clock.current_hour()) {
            self.change_state(VillagerState::Idle, ctx);
            return;
        }
        if !self.asleep {
            self.settle_in_bed(ctx);
        }
    }

    fn update_praying<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        let Some(started) = self.prayer_started_at else {
            self.begin_prayer(ctx);
            return;
        };
        let elapsed = (ctx.clock.current_hour() - started).rem_euclid(HOURS_PER_DAY);
        if elapsed >= self.config.prayer_duration_hours {
            debug!("{} finished praying", self.id);
            self.change_state(VillagerState::Idle, ctx);
        }
    }

    /// Lies down if at the bed, otherwise heads for it.
    fn settle_in_bed<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        if self.assigned_bed.is_none() {
            self.try_acquire_bed(ctx);
        }
        let Some(pos) = self.bed_position(ctx) else {
            self.change_state(VillagerState::Idle, ctx);
            return;
        };
        if ctx.nav.position().distance(pos) > self.config.bed_proximity {
            if ctx.nav.set_destination(pos) {
                self.set_target(pos, TargetKind::Bed);
                self.change_state(VillagerState::Walking, ctx);
            }
            return;
        }
        ctx.nav.stop();
        self.asleep = true;
        if let Some(bed) = self.assigned_bed {
            info!("{} started sleeping in {}", self.id, bed);
        }
    }

    /// Starts the prayer clock if at the shrine, otherwise heads for it.
    fn begin_prayer<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        let Some(shrine) = self.shrine else {
            return;
        };
        if ctx.nav.position().distance(shrine) <= self.config.shrine_proximity {
            ctx.nav.stop();
            self.prayer_started_at = Some(ctx.clock.current_hour());
            debug!("{} started praying", self.id);
        } else if ctx.nav.set_destination(shrine) {
            self.set_target(shrine, TargetKind::Shrine);
            self.change_state(VillagerState::Walking, ctx);
        }
    }

    fn try_acquire_bed<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        match ctx.beds.acquire(self.id) {
            Some(bed) => {
                info!("{} assigned {}", self.id, bed);
                self.assigned_bed = Some(bed);
            },
            None => {
                debug!("{} found no free bed", self.id);
                self.bed_search_failed = true;
            },
        }
    }

    /// Sleep position of the held bed. Drops the bed if it was unregistered.
    fn bed_position<N, C>(&mut self, ctx: &TickContext<'_, N, C>) -> Option<Vec2>
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        let bed = self.assigned_bed?;
        let pos = ctx.beds.sleep_position(bed);
        if pos.is_none() {
            warn!("{} held {} which no longer exists", self.id, bed);
            self.assigned_bed = None;
        }
        pos
    }

    fn release_bed<N, C>(&mut self, ctx: &mut TickContext<'_, N, C>)
    where
        N: Navigator + ?Sized,
        C: Clock + ?Sized,
    {
        if let Some(bed) = self.assigned_bed.take() {
            ctx.beds.release(bed);
            info!("{} gave up {}", self.id, bed);
        }
    }

    fn set_target(&mut self, point: Vec2, kind: TargetKind) {
        self.current_target = Some(point);
        self.target_kind = Some(kind);
    }

    fn sample_idle_duration(&mut self) -> f32 {
        let min = self.config.idle_duration_min.max(0.0);
        let max = self.config.idle_duration_max.max(min);
        min + self.rng.f32() * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beds::Bed;
    use crate::navigation::{NavStatus, OpenFieldNavigator};
    use crate::time::{DayNightCycle, FixedClock};

    /// Navigator whose answers are set by the test.
    struct ScriptedNav {
        position: Vec2,
        destination: Option<Vec2>,
        reachable: bool,
        arrived: bool,
        sample: Option<Vec2>,
        stopped: bool,
        destinations_set: usize,
    }

    impl ScriptedNav {
        fn new() -> Self {
            Self {
                position: Vec2::ZERO,
                destination: None,
                reachable: true,
                arrived: false,
                sample: Some(Vec2::new(3.0, 1.0)),
                stopped: true,
                destinations_set: 0,
            }
        }

        /// Teleports to the destination and reports arrival.
        fn arrive(&mut self) {
            if let Some(d) = self.destination {
                self.position = d;
            }
            self.arrived = true;
        }
    }

    impl Navigator for ScriptedNav {
        fn position(&self) -> Vec2 {
            self.position
        }

        fn set_destination(&mut self, point: Vec2) -> bool {
            if !self.reachable {
                return false;
            }
            self.destination = Some(point);
            self.arrived = false;
            self.destinations_set += 1;
            true
        }

        fn status(&self) -> NavStatus {
            NavStatus {
                path_pending: false,
                remaining_distance: if self.arrived { 0.0 } else { 10.0 },
                stopping_distance: 0.1,
                has_path: !self.arrived,
                speed: if self.arrived { 0.0 } else { 1.0 },
            }
        }

        fn stop(&mut self) {
            self.stopped = true;
        }

        fn resume(&mut self) {
            self.stopped = false;
        }

        fn sample_reachable_point(&mut self, _center: Vec2, _radius: f32) -> Option<Vec2> {
            self.sample
        }
    }

    fn villager() -> Villager {
        Villager::new(VillagerConfig::default(), fastrand::Rng::with_seed(5))
    }

    fn beds(n: u32) -> BedPool {
        let mut pool = BedPool::new();
        for i in 0..n {
            pool.register(Bed::new(BedId::new(i), Vec2::new(10.0 + i as f32, 0.0)));
        }
        pool
    }

    fn tick(v: &mut Villager, nav: &mut ScriptedNav, pool: &mut BedPool, hour: f32, dt: f32) {
        let clock = FixedClock(hour);
        v.tick(dt, &mut TickContext::new(nav, &clock, pool));
    }

    fn force(v: &mut Villager, nav: &mut ScriptedNav, pool: &mut BedPool, hour: f32, s: VillagerState) {
        let clock = FixedClock(hour);
        v.force_state(s, &mut TickContext::new(nav, &clock, pool));
    }

    /// Drives a villager from idle at 23:00 into bed.
    fn put_to_bed(v: &mut Villager, nav: &mut ScriptedNav, pool: &mut BedPool) {
        tick(v, nav, pool, 23.0, 0.1);
        assert_eq!(v.state(), VillagerState::Walking);
        nav.arrive();
        tick(v, nav, pool, 23.0, 0.1);
        assert_eq!(v.state(), VillagerState::Sleeping);
    }

    #[test]
    fn test_idle_wanders_after_pause() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);

        tick(&mut v, &mut nav, &mut pool, 12.0, 1.0);
        assert_eq!(v.state(), VillagerState::Idle);

        tick(&mut v, &mut nav, &mut pool, 12.0, 5.0);
        assert_eq!(v.state(), VillagerState::Walking);
        assert_eq!(v.current_target(), Some(Vec2::new(3.0, 1.0)));
        assert_eq!(v.target_kind(), Some(TargetKind::Wander));
        assert!(!nav.stopped);
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    fn test_wander_arrival_returns_to_idle() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        tick(&mut v, &mut nav, &mut pool, 12.0, 5.0);
        nav.arrive();
        tick(&mut v, &mut nav, &mut pool, 12.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
        assert!(v.current_target().is_none());
        assert!(nav.stopped);
    }

    #[test]
    fn test_unreachable_wander_point_keeps_idle() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        nav.reachable = false;
        let mut pool = beds(1);

        tick(&mut v, &mut nav, &mut pool, 12.0, 5.0);
        assert_eq!(v.state(), VillagerState::Idle);
        assert!(v.current_target().is_none());
        assert!(v.state_timer() < 0.001);
    }

    #[test]
    fn test_no_sample_point_reenters_idle() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        nav.sample = None;
        let mut pool = beds(1);
        tick(&mut v, &mut nav, &mut pool, 12.0, 5.0);
        assert_eq!(v.state(), VillagerState::Idle);
        assert_eq!(nav.destinations_set, 0);
    }

    #[test]
    fn test_night_leads_to_sleeping_in_bed() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(2);

        put_to_bed(&mut v, &mut nav, &mut pool);
        assert!(v.is_asleep());
        assert_eq!(v.assigned_bed(), Some(BedId::new(0)));
        assert!(pool.is_occupied(BedId::new(0)));
        assert_eq!(pool.get(BedId::new(0)).and_then(Bed::assigned), Some(v.id()));
        assert!(nav.stopped);
    }

    #[test]
    fn test_morning_wakes_and_releases_bed() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        put_to_bed(&mut v, &mut nav, &mut pool);

        tick(&mut v, &mut nav, &mut pool, 3.0, 0.1);
        assert_eq!(v.state(), VillagerState::Sleeping);

        tick(&mut v, &mut nav, &mut pool, 9.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
        assert!(v.assigned_bed().is_none());
        assert!(!v.is_asleep());
        assert!(pool.is_available(BedId::new(0)));
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn test_bed_released_exactly_once() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        put_to_bed(&mut v, &mut nav, &mut pool);

        force(&mut v, &mut nav, &mut pool, 23.0, VillagerState::Idle);
        assert_eq!(pool.available_count(), 1);
        force(&mut v, &mut nav, &mut pool, 23.0, VillagerState::Eating);
        assert_eq!(pool.available_count(), 1);
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    fn test_far_from_bed_walks_there_first() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);

        force(&mut v, &mut nav, &mut pool, 23.0, VillagerState::Sleeping);
        assert_eq!(v.state(), VillagerState::Walking);
        assert_eq!(v.target_kind(), Some(TargetKind::Bed));
        assert_eq!(v.current_target(), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(v.assigned_bed(), Some(BedId::new(0)));
    }

    #[test]
    fn test_unreachable_bed_keeps_idle_with_pending_bed() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        nav.reachable = false;
        let mut pool = beds(1);

        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
        assert_eq!(v.assigned_bed(), Some(BedId::new(0)));

        nav.reachable = true;
        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        assert_eq!(v.state(), VillagerState::Walking);
        assert_eq!(pool.occupied_count(), 1);
    }

    #[test]
    fn test_exhausted_pool_retries_later() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = BedPool::new();

        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
        assert!(v.assigned_bed().is_none());

        pool.register(Bed::new(BedId::new(7), Vec2::new(4.0, 4.0)));
        // Still waiting out the idle pause.
        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        assert!(v.assigned_bed().is_none());

        tick(&mut v, &mut nav, &mut pool, 23.0, 5.0);
        tick(&mut v, &mut nav, &mut pool, 23.0, 0.1);
        assert_eq!(v.assigned_bed(), Some(BedId::new(7)));
        assert_eq!(v.state(), VillagerState::Walking);
    }

    #[test]
    fn test_night_interrupts_wander() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        tick(&mut v, &mut nav, &mut pool, 21.0, 5.0);
        assert_eq!(v.target_kind(), Some(TargetKind::Wander));

        tick(&mut v, &mut nav, &mut pool, 22.5, 0.1);
        assert_eq!(v.state(), VillagerState::Walking);
        assert_eq!(v.target_kind(), Some(TargetKind::Bed));
        assert_eq!(v.assigned_bed(), Some(BedId::new(0)));
    }

    #[test]
    fn test_night_interrupt_without_bed_goes_idle() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = BedPool::new();
        tick(&mut v, &mut nav, &mut pool, 21.0, 5.0);
        tick(&mut v, &mut nav, &mut pool, 22.5, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
    }

    #[test]
    fn test_morning_cancels_walk_to_bed() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        tick(&mut v, &mut nav, &mut pool, 7.5, 0.1);
        assert_eq!(v.target_kind(), Some(TargetKind::Bed));

        tick(&mut v, &mut nav, &mut pool, 8.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn test_blocked_walk_is_not_arrival() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        tick(&mut v, &mut nav, &mut pool, 12.0, 5.0);
        for _ in 0..10 {
            tick(&mut v, &mut nav, &mut pool, 12.0, 1.0);
        }
        assert_eq!(v.state(), VillagerState::Walking);
    }

    #[test]
    fn test_praying_at_shrine() {
        let mut v = villager().with_shrine(Vec2::new(0.5, 0.0));
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);

        force(&mut v, &mut nav, &mut pool, 10.0, VillagerState::Praying);
        assert_eq!(v.state(), VillagerState::Praying);
        tick(&mut v, &mut nav, &mut pool, 10.5, 0.1);
        assert_eq!(v.state(), VillagerState::Praying);
        tick(&mut v, &mut nav, &mut pool, 11.0, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
    }

    #[test]
    fn test_prayer_across_midnight() {
        let mut v = villager().with_shrine(Vec2::ZERO);
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        force(&mut v, &mut nav, &mut pool, 23.5, VillagerState::Praying);
        tick(&mut v, &mut nav, &mut pool, 0.2, 0.1);
        assert_eq!(v.state(), VillagerState::Praying);
        tick(&mut v, &mut nav, &mut pool, 0.6, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
    }

    #[test]
    fn test_walk_to_shrine_then_pray() {
        let mut v = villager().with_shrine(Vec2::new(8.0, 8.0));
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);

        force(&mut v, &mut nav, &mut pool, 14.0, VillagerState::Praying);
        assert_eq!(v.state(), VillagerState::Walking);
        assert_eq!(v.target_kind(), Some(TargetKind::Shrine));

        nav.arrive();
        tick(&mut v, &mut nav, &mut pool, 14.2, 0.1);
        assert_eq!(v.state(), VillagerState::Praying);
        tick(&mut v, &mut nav, &mut pool, 15.3, 0.1);
        assert_eq!(v.state(), VillagerState::Idle);
    }

    #[test]
    fn test_praying_without_shrine() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        force(&mut v, &mut nav, &mut pool, 14.0, VillagerState::Praying);
        assert_eq!(v.state(), VillagerState::Idle);
    }

    #[test]
    fn test_stub_states_return_to_idle() {
        for state in [VillagerState::Eating, VillagerState::Build] {
            let mut v = villager();
            let mut nav = ScriptedNav::new();
            let mut pool = beds(1);
            force(&mut v, &mut nav, &mut pool, 12.0, state);
            assert_eq!(v.state(), state);
            tick(&mut v, &mut nav, &mut pool, 12.0, 0.1);
            assert_eq!(v.state(), VillagerState::Idle);
        }
    }

    #[test]
    fn test_debug_snapshot() {
        let mut v = villager();
        let mut nav = ScriptedNav::new();
        let mut pool = beds(1);
        put_to_bed(&mut v, &mut nav, &mut pool);

        let info = v.debug_snapshot(&FixedClock(23.0));
        assert_eq!(info.state, VillagerState::Sleeping);
        assert_eq!(info.bed, Some(BedId::new(0)));
        let text = info.to_string();
        assert!(text.starts_with("State: Sleeping\n"));
        assert!(text.contains("Game Hour: 23.00"));
        assert!(text.contains("Destination: (10.00, 0.00)"));
    }

    #[test]
    fn test_full_night_with_open_field() {
        let mut clock = DayNightCycle::starting_at(21.9).with_day_length(240.0);
        let mut nav = OpenFieldNavigator::new(Vec2::ZERO, Vec2::ZERO, 20.0, fastrand::Rng::with_seed(2));
        let mut pool = BedPool::new();
        let bed_pos = Vec2::new(3.0, 0.0);
        pool.register(Bed::new(BedId::new(0), bed_pos));
        let mut v = villager();

        let mut slept = false;
        for _ in 0..2_000 {
            clock.update(0.1);
            nav.step(0.1);
            v.tick(0.1, &mut TickContext::new(&mut nav, &clock, &mut pool));
            if v.is_asleep() {
                slept = true;
                assert!(nav.position().distance(bed_pos) <= 1.5);
                assert!(pool.is_occupied(BedId::new(0)));
            }
        }

        assert!(slept);
        assert!(clock.is_day());
        assert_ne!(v.state(), VillagerState::Sleeping);
        assert_eq!(pool.occupied_count(), 0);
    }
}
