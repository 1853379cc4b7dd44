//! Dwell countdown: arms when the agent settles inside a zone, fires once when
//! the countdown runs out, and resets the moment the agent leaves.

use std::time::Duration;

use tracing::debug;

use super::zone::ZoneId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellCadence {
    /// Remaining time drops by the tick delta every tick.
    Continuous,
    /// Remaining time drops by one period each time the countdown task fires.
    Interval { period: Duration },
}

impl Default for DwellCadence {
    fn default() -> Self {
        Self::Interval {
            period: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellState {
    Idle,
    Counting { zone: ZoneId, remaining: f32 },
    Fired { zone: ZoneId },
}

/// Repeating fixed-period task driven by tick deltas. Inactive tasks never fire.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTask {
    period: Duration,
    elapsed: Duration,
    active: bool,
}

impl IntervalTask {
    pub fn new(period: Duration) -> Self {
        Self {
            period: normalize_period(period),
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.elapsed = Duration::ZERO;
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns how many whole periods elapsed during `dt_seconds`.
    pub fn advance(&mut self, dt_seconds: f32) -> u32 {
        if !self.active {
            return 0;
        }
        let Some(dt) = tick_duration(dt_seconds) else {
            return 0;
        };

        self.elapsed = self.elapsed.saturating_add(dt);
        let period_nanos = self.period.as_nanos();
        let elapsed_nanos = self.elapsed.as_nanos();
        self.elapsed = Duration::from_nanos((elapsed_nanos % period_nanos) as u64);
        u32::try_from(elapsed_nanos / period_nanos).unwrap_or(u32::MAX)
    }
}

fn normalize_period(period: Duration) -> Duration {
    if period.is_zero() {
        Duration::from_secs(1)
    } else {
        period
    }
}

fn tick_duration(dt_seconds: f32) -> Option<Duration> {
    if dt_seconds.is_finite() && dt_seconds > 0.0 {
        Duration::try_from_secs_f32(dt_seconds).ok()
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct DwellTimer {
    duration_seconds: f32,
    duration: Duration,
    /// Time counted toward the armed zone. Kept as a `Duration` so per-tick
    /// deltas add up without drifting past the deadline.
    counted: Duration,
    cadence: DwellCadence,
    countdown_task: IntervalTask,
    state: DwellState,
}

impl DwellTimer {
    pub fn new(duration_seconds: f32, cadence: DwellCadence) -> Self {
        let period = match cadence {
            DwellCadence::Continuous => Duration::from_secs(1),
            DwellCadence::Interval { period } => period,
        };
        let duration_seconds = duration_seconds.max(0.0);
        Self {
            duration_seconds,
            duration: Duration::try_from_secs_f32(duration_seconds).unwrap_or(Duration::MAX),
            counted: Duration::ZERO,
            cadence,
            countdown_task: IntervalTask::new(period),
            state: DwellState::Idle,
        }
    }

    pub fn state(&self) -> DwellState {
        self.state
    }

    pub fn duration_seconds(&self) -> f32 {
        self.duration_seconds
    }

    pub fn armed_zone(&self) -> Option<ZoneId> {
        match self.state {
            DwellState::Counting { zone, .. } => Some(zone),
            DwellState::Idle | DwellState::Fired { .. } => None,
        }
    }

    pub fn remaining_seconds(&self) -> f32 {
        match self.state {
            DwellState::Idle => self.duration_seconds,
            DwellState::Counting { remaining, .. } => remaining.max(0.0),
            DwellState::Fired { .. } => 0.0,
        }
    }

    /// Whole seconds left, rounded up, for countdown displays.
    pub fn remaining_display_seconds(&self) -> u32 {
        self.remaining_seconds().ceil() as u32
    }

    pub fn countdown_task_active(&self) -> bool {
        self.countdown_task.is_active()
    }

    /// Feeds this tick's overlap result. Returns the zone that fired, if any.
    pub fn update(&mut self, overlap: Option<ZoneId>, dt_seconds: f32) -> Option<ZoneId> {
        match (self.state, overlap) {
            (DwellState::Idle, None) => None,
            (DwellState::Idle, Some(zone)) => {
                self.arm(zone);
                None
            }
            (DwellState::Counting { zone, .. }, Some(current)) if current == zone => {
                self.count_down(zone, dt_seconds)
            }
            (DwellState::Counting { zone, .. }, Some(current)) => {
                debug!(zone = %zone, next = %current, "dwell_cancelled");
                self.arm(current);
                None
            }
            (DwellState::Counting { zone, .. }, None) => {
                debug!(zone = %zone, "dwell_cancelled");
                self.reset();
                None
            }
            (DwellState::Fired { zone }, Some(current)) if current == zone => None,
            (DwellState::Fired { .. }, Some(current)) => {
                self.arm(current);
                None
            }
            (DwellState::Fired { .. }, None) => {
                self.reset();
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.countdown_task.cancel();
        self.counted = Duration::ZERO;
        self.state = DwellState::Idle;
    }

    fn arm(&mut self, zone: ZoneId) {
        self.countdown_task.cancel();
        self.counted = Duration::ZERO;
        if matches!(self.cadence, DwellCadence::Interval { .. }) {
            self.countdown_task.start();
        }
        self.state = DwellState::Counting {
            zone,
            remaining: self.duration_seconds,
        };
        debug!(zone = %zone, remaining = self.duration_seconds, "dwell_armed");
    }

    fn count_down(&mut self, zone: ZoneId, dt_seconds: f32) -> Option<ZoneId> {
        let step = match self.cadence {
            DwellCadence::Continuous => tick_duration(dt_seconds).unwrap_or(Duration::ZERO),
            DwellCadence::Interval { period } => {
                let fired = self.countdown_task.advance(dt_seconds);
                normalize_period(period).saturating_mul(fired)
            }
        };
        self.counted = self.counted.saturating_add(step);

        if self.counted >= self.duration {
            self.countdown_task.cancel();
            self.state = DwellState::Fired { zone };
            return Some(zone);
        }

        self.state = DwellState::Counting {
            zone,
            remaining: (self.duration - self.counted).as_secs_f32(),
        };
        None
    }
}
