//! Movement, zone overlap and dwell timing, independent of any window or
//! renderer. Hosts drive it through [`Simulation::tick`].

mod dwell;
mod geometry;
mod planar;
mod simulation;
mod walker;
mod zone;

pub use dwell::{DwellCadence, DwellState, DwellTimer, IntervalTask};
pub use geometry::{box_contains_horizontal, circle_contains, Vec2, Vec3};
pub use planar::{
    clamp_position_pct, homing_step, keyboard_step, planar_direction, ClampedPlanar, PlanarBody,
    PlanarSettings, ViewportPx,
};
pub use simulation::{
    Movement, MovementIntent, NavigationSink, RecordingSink, Simulation, TickReport,
};
pub use walker::{FreeVertical, VerticalState, WalkerBody, WalkerSettings};
pub use zone::{Zone, ZoneId, ZoneSet, ZoneShape};
