//! Navigation interface used by villager AI.
//!
//! Pathfinding itself lives outside this crate. Villagers only issue
//! destination commands and poll whether they got there.

use glam::Vec2;
use tracing::trace;

/// Speeds below this count as standing still.
const STOPPED_SPEED_EPSILON: f32 = 1e-3;

/// Snapshot of a navigation agent's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavStatus {
    /// A path is still being computed
    pub path_pending: bool,
    /// Distance left along the current path
    pub remaining_distance: f32,
    /// Distance at which the agent stops short of the goal
    pub stopping_distance: f32,
    /// The agent is following a path
    pub has_path: bool,
    /// Current speed
    pub speed: f32,
}

impl NavStatus {
    /// Whether the agent has arrived at its destination.
    ///
    /// Not pending, within stopping distance, and either pathless or at rest.
    /// An agent blocked short of its goal has not arrived.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        !self.path_pending
            && self.remaining_distance <= self.stopping_distance
            && (!self.has_path || self.speed.abs() < STOPPED_SPEED_EPSILON)
    }
}

/// Movement capability of one villager.
pub trait Navigator {
    /// Current position of the agent.
    fn position(&self) -> Vec2;

    /// Requests a path to `point`. Returns false if it is unreachable.
    fn set_destination(&mut self, point: Vec2) -> bool;

    /// Current progress towards the destination.
    fn status(&self) -> NavStatus;

    /// Whether the agent has arrived. See [`NavStatus::has_arrived`].
    fn has_arrived(&self) -> bool {
        self.status().has_arrived()
    }

    /// Halts movement, keeping the destination.
    fn stop(&mut self);

    /// Resumes movement towards the destination.
    fn resume(&mut self);

    /// Finds a reachable point within `radius` of `center`.
    fn sample_reachable_point(&mut self, center: Vec2, radius: f32) -> Option<Vec2>;
}

/// Straight-line mover over a circular walkable area.
///
/// Anything inside the area is reachable. There are no obstacles, so paths
/// are never pending.
#[derive(Debug, Clone)]
pub struct OpenFieldNavigator {
    position: Vec2,
    destination: Option<Vec2>,
    stopped: bool,
    speed: f32,
    velocity: Vec2,
    stopping_distance: f32,
    area_center: Vec2,
    area_radius: f32,
    rng: fastrand::Rng,
}

impl OpenFieldNavigator {
    /// Creates a navigator at `position` inside the disc `(area_center, area_radius)`.
    #[must_use]
    pub fn new(position: Vec2, area_center: Vec2, area_radius: f32, rng: fastrand::Rng) -> Self {
        Self {
            position,
            destination: None,
            stopped: true,
            speed: 2.0,
            velocity: Vec2::ZERO,
            stopping_distance: 0.1,
            area_center,
            area_radius: area_radius.max(0.0),
            rng,
        }
    }

    /// Sets the walking speed (units per second).
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Current destination, if any.
    #[must_use]
    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    /// Whether `point` lies in the walkable area.
    #[must_use]
    pub fn is_walkable(&self, point: Vec2) -> bool {
        point.distance(self.area_center) <= self.area_radius
    }

    /// Moves towards the destination for `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.velocity = Vec2::ZERO;
        if self.stopped {
            return;
        }
        let Some(goal) = self.destination else {
            return;
        };
        let to_goal = goal - self.position;
        let dist = to_goal.length();
        if dist <= self.stopping_distance {
            return;
        }
        let travel = (self.speed * dt).min(dist);
        self.velocity = to_goal / dist * self.speed;
        self.position += to_goal / dist * travel;
        trace!("Moved to ({:.2}, {:.2})", self.position.x, self.position.y);
    }
}

impl Navigator for OpenFieldNavigator {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_destination(&mut self, point: Vec2) -> bool {
        if !self.is_walkable(point) {
            return false;
        }
        self.destination = Some(point);
        true
    }

    fn status(&self) -> NavStatus {
        let remaining = self
            .destination
            .map_or(0.0, |goal| goal.distance(self.position));
        NavStatus {
            path_pending: false,
            remaining_distance: remaining,
            stopping_distance: self.stopping_distance,
            has_path: self.destination.is_some() && remaining > self.stopping_distance,
            speed: self.velocity.length(),
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec2::ZERO;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn sample_reachable_point(&mut self, center: Vec2, radius: f32) -> Option<Vec2> {
        let angle = self.rng.f32() * std::f32::consts::TAU;
        let dist = self.rng.f32() * radius.max(0.0);
        let candidate = center + Vec2::from_angle(angle) * dist;
        self.is_walkable(candidate).then_some(candidate)
    }
}
