use tracing::info;

use super::dwell::{DwellState, DwellTimer};
use super::geometry::Vec3;
use super::zone::{ZoneId, ZoneSet, ZoneShape};

/// Logical movement flags sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub crouch: bool,
    pub jump: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl MovementIntent {
    pub fn has_direction(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

pub trait Movement {
    type Body;

    fn advance(&mut self, body: &mut Self::Body, intent: &MovementIntent, dt_seconds: f32);
    fn overlaps(&self, body: &Self::Body, shape: &ZoneShape) -> bool;
    fn report_position(&self, body: &Self::Body) -> Vec3;
}

pub trait NavigationSink {
    fn navigate(&mut self, target: &str);
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub targets: Vec<String>,
}

impl NavigationSink for RecordingSink {
    fn navigate(&mut self, target: &str) {
        self.targets.push(target.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub position: Vec3,
    pub overlapping: Option<ZoneId>,
    pub armed_zone: Option<ZoneId>,
    pub remaining_seconds: f32,
    pub remaining_display_seconds: u32,
    pub fired: Option<ZoneId>,
}

/// One agent, one zone list, one dwell timer, advanced by a single `tick`.
pub struct Simulation<M: Movement> {
    movement: M,
    body: M::Body,
    zones: ZoneSet,
    dwell: DwellTimer,
    running: bool,
}

impl<M: Movement> Simulation<M> {
    pub fn new(movement: M, body: M::Body, zones: ZoneSet, dwell: DwellTimer) -> Self {
        Self {
            movement,
            body,
            zones,
            dwell,
            running: true,
        }
    }

    pub fn movement(&self) -> &M {
        &self.movement
    }

    pub fn movement_mut(&mut self) -> &mut M {
        &mut self.movement
    }

    pub fn body(&self) -> &M::Body {
        &self.body
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn dwell(&self) -> &DwellTimer {
        &self.dwell
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the simulation from the next tick on. The current tick, if any,
    /// completes normally.
    pub fn stop(&mut self) {
        self.running = false;
        self.dwell.reset();
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Movement, then overlap, then dwell. Returns `None` once stopped.
    pub fn tick(
        &mut self,
        intent: &MovementIntent,
        dt_seconds: f32,
        sink: &mut dyn NavigationSink,
    ) -> Option<TickReport> {
        if !self.running {
            return None;
        }

        self.movement.advance(&mut self.body, intent, dt_seconds);

        let movement = &self.movement;
        let body = &self.body;
        let overlapping = self
            .zones
            .first_overlapping(|shape| movement.overlaps(body, shape))
            .map(|zone| zone.id);

        let fired = self.dwell.update(overlapping, dt_seconds);
        if let Some(zone_id) = fired {
            if let Some(zone) = self.zones.get(zone_id) {
                info!(zone = %zone_id, label = %zone.label, target = %zone.target, "dwell_fired");
                sink.navigate(&zone.target);
            }
        }

        Some(self.report(overlapping, fired))
    }

    pub fn current_report(&self) -> TickReport {
        let overlapping = match self.dwell.state() {
            DwellState::Counting { zone, .. } | DwellState::Fired { zone } => Some(zone),
            DwellState::Idle => None,
        };
        self.report(overlapping, None)
    }

    fn report(&self, overlapping: Option<ZoneId>, fired: Option<ZoneId>) -> TickReport {
        TickReport {
            position: self.movement.report_position(&self.body),
            overlapping,
            armed_zone: self.dwell.armed_zone(),
            remaining_seconds: self.dwell.remaining_seconds(),
            remaining_display_seconds: self.dwell.remaining_display_seconds(),
            fired,
        }
    }
}
