//! Time and day/night cycle system.
//!
//! This module provides game time management:
//! - Day/night cycle with configurable day length
//! - Day/night transition events (06:00 and 18:00)
//! - The sleep schedule villagers follow

use serde::{Deserialize, Serialize};

/// Hours in a game day.
pub const HOURS_PER_DAY: f32 = 24.0;
/// Default real seconds per full game day (10 minutes).
pub const DEFAULT_DAY_LENGTH_SECONDS: f32 = 600.0;
/// Default starting hour (08:00).
pub const DEFAULT_START_HOUR: f32 = 8.0;
/// Hour at which daytime begins.
pub const DAY_START_HOUR: f32 = 6.0;
/// Hour at which nighttime begins.
pub const NIGHT_START_HOUR: f32 = 18.0;

/// Source of the current time of day.
pub trait Clock {
    /// Current hour in `[0, 24)`.
    fn current_hour(&self) -> f32;
}

/// A clock stuck at one hour. Handy for tests and tooling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f32);

impl Clock for FixedClock {
    fn current_hour(&self) -> f32 {
        self.0.rem_euclid(HOURS_PER_DAY)
    }
}

/// Game clock with a day/night cycle.
///
/// Time is the hour of day in `[0, 24)` plus a day counter. By default one full
/// day takes 600 real seconds and the clock starts at 08:00.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayNightCycle {
    /// Current hour of day.
    hour: f32,
    /// Number of completed days, starting at 1.
    day: u32,
    /// Real seconds per full game day.
    day_length_seconds: f32,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl DayNightCycle {
    /// Create a new cycle at 08:00 on day 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(DEFAULT_START_HOUR)
    }

    /// Create a cycle starting at `hour` on day 1.
    #[must_use]
    pub fn starting_at(hour: f32) -> Self {
        Self {
            hour: hour.rem_euclid(HOURS_PER_DAY),
            day: 1,
            day_length_seconds: DEFAULT_DAY_LENGTH_SECONDS,
        }
    }

    /// Sets the real seconds per game day.
    #[must_use]
    pub fn with_day_length(mut self, seconds: f32) -> Self {
        self.set_day_length(seconds);
        self
    }

    /// Set the real seconds per game day (minimum 1 second).
    pub fn set_day_length(&mut self, seconds: f32) {
        self.day_length_seconds = seconds.max(1.0);
    }

    /// Real seconds per game day.
    #[must_use]
    pub fn day_length(&self) -> f32 {
        self.day_length_seconds
    }

    /// Current hour of day, fractional.
    #[must_use]
    pub fn hour(&self) -> f32 {
        self.hour
    }

    /// Current day number.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Check if it's daytime (06:00 to 18:00).
    #[must_use]
    pub fn is_day(&self) -> bool {
        (DAY_START_HOUR..NIGHT_START_HOUR).contains(&self.hour)
    }

    /// Check if it's nighttime.
    #[must_use]
    pub fn is_night(&self) -> bool {
        !self.is_day()
    }

    /// Get a formatted time string (HH:MM).
    #[must_use]
    pub fn format_time(&self) -> String {
        let whole = self.hour.floor();
        let minute = ((self.hour - whole) * 60.0).floor() as u32;
        format!("{:02}:{:02}", whole as u32, minute.min(59))
    }

    /// Advance the clock by `dt` real seconds.
    ///
    /// Returns `Some(event)` if a day, day/night or hour boundary was crossed.
    /// When several are crossed in one step the most significant one is
    /// reported: new day, then day/night, then hour.
    pub fn update(&mut self, dt: f32) -> Option<TimeEvent> {
        let was_day = self.is_day();
        let old_hour = self.hour.floor() as u32;

        self.hour += HOURS_PER_DAY / self.day_length_seconds * dt.max(0.0);

        let mut event = None;
        while self.hour >= HOURS_PER_DAY {
            self.hour -= HOURS_PER_DAY;
            self.day += 1;
            event = Some(TimeEvent::NewDay(self.day));
        }
        if event.is_some() {
            return event;
        }

        let is_day = self.is_day();
        if !was_day && is_day {
            return Some(TimeEvent::DayStarted);
        }
        if was_day && !is_day {
            return Some(TimeEvent::NightStarted);
        }

        let new_hour = self.hour.floor() as u32;
        (new_hour != old_hour).then_some(TimeEvent::HourChanged(new_hour))
    }

    /// Jump to `hour` on the current day.
    pub fn set_hour(&mut self, hour: f32) {
        self.hour = hour.rem_euclid(HOURS_PER_DAY);
    }
}

impl Clock for DayNightCycle {
    fn current_hour(&self) -> f32 {
        self.hour
    }
}

/// Events that can occur during time updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeEvent {
    /// A new day has started.
    NewDay(u32),
    /// Day has started (transition from night).
    DayStarted,
    /// Night has started (transition from day).
    NightStarted,
    /// Hour has changed.
    HourChanged(u32),
}

impl TimeEvent {
    /// Get a description of this event.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::NewDay(day) => format!("Day {day} has begun"),
            Self::DayStarted => "Daytime".to_string(),
            Self::NightStarted => "Nighttime".to_string(),
            Self::HourChanged(h) => format!("It's {h}:00"),
        }
    }
}

/// Hours during which villagers sleep.
///
/// The sleep window is `[sleep_hour, 24) ∪ [0, wake_hour)`; the wake window
/// is its complement, so a villager is never told to do both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepSchedule {
    /// Bedtime hour
    pub sleep_hour: f32,
    /// Wake-up hour
    pub wake_hour: f32,
}

impl Default for SleepSchedule {
    fn default() -> Self {
        Self {
            sleep_hour: 22.0,
            wake_hour: 8.0,
        }
    }
}

impl SleepSchedule {
    /// Whether `hour` falls in the sleep window.
    #[must_use]
    pub fn is_sleep_time(&self, hour: f32) -> bool {
        if self.sleep_hour >= self.wake_hour {
            hour >= self.sleep_hour || hour < self.wake_hour
        } else {
            (self.sleep_hour..self.wake_hour).contains(&hour)
        }
    }

    /// Whether `hour` falls in the wake window.
    #[must_use]
    pub fn is_wake_time(&self, hour: f32) -> bool {
        !self.is_sleep_time(hour)
    }
}
