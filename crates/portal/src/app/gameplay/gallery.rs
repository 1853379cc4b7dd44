use dwell_engine::app::{box_footprint, world_to_screen, Viewport, PIXELS_PER_WORLD};
use dwell_engine::sim::{
    FreeVertical, Simulation, TickReport, Vec2, Vec3, WalkerBody, ZoneShape,
};
use dwell_engine::{
    InputSnapshot, Scene, SceneCommand, SceneKey, SceneStatus, SceneView, SessionConfig,
    ShapeStyle, ViewShape,
};
use tracing::info;

use super::sink::TracingNavigationSink;
use super::{countdown_fraction, dwell_title, zone_style};

const SCENE_NAME: &str = "gallery";
const WALKER_RADIUS_WORLD: f32 = 0.4;
const FACING_MARKER_DISTANCE_WORLD: f32 = 0.9;
const FACING_MARKER_HALF_SIZE_PX: f32 = 3.0;
const CONTROLS_HELP: &str =
    "W/A/S/D move; Q/E turn; Shift sprint; C crouch; Space jump; Tab switches scene; Esc quits";

/// Free-Vertical walk scene with box zones, drawn top-down around the walker.
pub(crate) struct GalleryScene {
    sim: Simulation<FreeVertical>,
    sink: TracingNavigationSink,
    last_report: TickReport,
    help_logged: bool,
}

impl GalleryScene {
    pub(crate) fn new(session: &SessionConfig) -> Self {
        let settings = session.walker.settings();
        let body = WalkerBody::standing_at(session.walker.start(), &settings);
        let sim = Simulation::new(
            FreeVertical::new(settings),
            body,
            session.box_zone_set(),
            session.dwell.timer(),
        );
        let last_report = sim.current_report();
        Self {
            sim,
            sink: TracingNavigationSink::new(SCENE_NAME),
            last_report,
            help_logged: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> &Simulation<FreeVertical> {
        &self.sim
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &TracingNavigationSink {
        &self.sink
    }
}

impl Scene for GalleryScene {
    fn load(&mut self) {
        self.sim.resume();
        if !self.help_logged {
            info!(
                scene = SCENE_NAME,
                zones = self.sim.zones().len(),
                controls = CONTROLS_HELP,
                "controls_help"
            );
            self.help_logged = true;
        }
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(SceneKey::Lobby);
        }

        let intent = input.movement_intent();
        if let Some(report) = self.sim.tick(&intent, fixed_dt_seconds, &mut self.sink) {
            self.last_report = report;
        }
        SceneCommand::None
    }

    fn view(&self, window_size: (u32, u32)) -> SceneView {
        let viewport = Viewport {
            width: window_size.0,
            height: window_size.1,
        };
        let body = self.sim.body();
        let position = self.last_report.position;
        let camera = Vec2::new(position.x, position.z);
        let project = |world: Vec3| world_to_screen(world, camera, viewport, PIXELS_PER_WORLD);
        let mut shapes = Vec::with_capacity(self.sim.zones().len() + 2);

        for zone in self.sim.zones().iter() {
            if let ZoneShape::Box {
                center,
                half_extents,
                rotation_y,
            } = zone.shape
            {
                let corners = box_footprint(center, half_extents, rotation_y);
                shapes.push(ViewShape::Quad {
                    corners_px: corners.map(project),
                    style: zone_style(&self.last_report, zone.id),
                });
            }
        }

        let crouch_scale = if body.vertical.crouching { 0.75 } else { 1.0 };
        shapes.push(ViewShape::Circle {
            center_px: project(position),
            radius_px: WALKER_RADIUS_WORLD * PIXELS_PER_WORLD * crouch_scale,
            filled: true,
            style: ShapeStyle::Agent,
        });

        let (sin, cos) = body.yaw.sin_cos();
        let facing = Vec3::new(
            position.x - sin * FACING_MARKER_DISTANCE_WORLD,
            position.y,
            position.z - cos * FACING_MARKER_DISTANCE_WORLD,
        );
        shapes.push(ViewShape::Cross {
            center_px: project(facing),
            half_size_px: FACING_MARKER_HALF_SIZE_PX,
            style: ShapeStyle::Marker,
        });

        SceneView {
            shapes,
            countdown_fraction: countdown_fraction(
                &self.last_report,
                self.sim.dwell().duration_seconds(),
            ),
        }
    }

    fn unload(&mut self) {
        self.sim.stop();
        self.last_report = self.sim.current_report();
        info!(scene = SCENE_NAME, "scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let position = self.last_report.position;
        Some(format!(
            "{} | pos ({:.1}, {:.2}, {:.1})",
            dwell_title("Gallery", &self.last_report, self.sim.zones(), &self.sink),
            position.x,
            position.y,
            position.z
        ))
    }

    fn status(&self) -> SceneStatus {
        SceneStatus::from_report(&self.last_report, self.sink.fired())
    }
}
