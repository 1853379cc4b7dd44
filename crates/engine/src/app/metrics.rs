use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use super::scene::SceneStatus;
use crate::sim::{Vec3, ZoneId};

static PRESENTATION_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_presentation_lock_poison_once(operation: &'static str) {
    if PRESENTATION_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "presentation lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PresentationSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub position: Vec3,
    pub overlapping_zone: Option<ZoneId>,
    pub armed_zone: Option<ZoneId>,
    pub remaining_seconds: f32,
    pub remaining_display_seconds: u32,
    pub navigations_fired: u32,
}

/// Shared read side for observers outside the event loop.
#[derive(Clone, Debug)]
pub struct PresentationHandle {
    snapshot: Arc<RwLock<PresentationSnapshot>>,
}

impl Default for PresentationHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(PresentationSnapshot::default())),
        }
    }
}

impl PresentationHandle {
    pub fn snapshot(&self) -> PresentationSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_presentation_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish_loop_metrics(&self, metrics: LoopMetricsSnapshot) {
        self.update("write_loop_metrics", |snapshot| {
            snapshot.fps = metrics.fps;
            snapshot.tps = metrics.tps;
            snapshot.frame_time_ms = metrics.frame_time_ms;
        });
    }

    pub(crate) fn publish_scene_status(&self, status: SceneStatus) {
        self.update("write_scene_status", |snapshot| {
            snapshot.position = status.position;
            snapshot.overlapping_zone = status.overlapping_zone;
            snapshot.armed_zone = status.armed_zone;
            snapshot.remaining_seconds = status.remaining_seconds;
            snapshot.remaining_display_seconds = status.remaining_display_seconds;
            snapshot.navigations_fired = status.navigations_fired;
        });
    }

    fn update(&self, operation: &'static str, apply: impl FnOnce(&mut PresentationSnapshot)) {
        match self.snapshot.write() {
            Ok(mut guard) => apply(&mut *guard),
            Err(poisoned) => {
                warn_presentation_lock_poison_once(operation);
                let mut guard = poisoned.into_inner();
                apply(&mut *guard);
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}
