use dwell_engine::sim::{
    ClampedPlanar, PlanarBody, Simulation, TickReport, Vec2, ViewportPx, ZoneShape,
};
use dwell_engine::{
    InputSnapshot, Scene, SceneCommand, SceneKey, SceneStatus, SceneView, SessionConfig,
    ShapeStyle, ViewShape,
};
use tracing::{debug, info};

use super::sink::TracingNavigationSink;
use super::{countdown_fraction, dwell_title, zone_style};

const SCENE_NAME: &str = "lobby";
const HOMING_MARKER_HALF_SIZE_PX: f32 = 6.0;
const CONTROLS_HELP: &str =
    "W/A/S/D or arrows move; left click to glide; Tab switches scene; Esc quits";

/// Clamped-Planar landing scene with circular zones.
pub(crate) struct LobbyScene {
    sim: Simulation<ClampedPlanar>,
    sink: TracingNavigationSink,
    last_report: TickReport,
    help_logged: bool,
}

impl LobbyScene {
    pub(crate) fn new(session: &SessionConfig) -> Self {
        let movement = ClampedPlanar::new(session.planar.settings(), ViewportPx::new(0.0, 0.0));
        let body = PlanarBody {
            position_pct: session.planar.start(),
            diameter_px: session.planar.agent_diameter_px,
        };
        let sim = Simulation::new(
            movement,
            body,
            session.circle_zone_set(),
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
    pub(crate) fn simulation(&self) -> &Simulation<ClampedPlanar> {
        &self.sim
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &TracingNavigationSink {
        &self.sink
    }

    fn apply_click(&mut self, input: &InputSnapshot, viewport: ViewportPx) {
        if !input.left_click_pressed() || input.movement_intent().has_direction() {
            return;
        }
        let Some(target_pct) = input
            .cursor_position_px()
            .and_then(|cursor| viewport.px_to_pct(cursor))
        else {
            return;
        };
        debug!(x_pct = target_pct.x, y_pct = target_pct.y, "homing_target_set");
        self.sim.movement_mut().set_homing_target(Some(target_pct));
    }
}

impl Scene for LobbyScene {
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
            return SceneCommand::SwitchTo(SceneKey::Gallery);
        }

        let (width, height) = input.window_size();
        let viewport = ViewportPx::new(width as f32, height as f32);
        self.sim.movement_mut().set_viewport(viewport);
        self.apply_click(input, viewport);

        let intent = input.movement_intent();
        if let Some(report) = self.sim.tick(&intent, fixed_dt_seconds, &mut self.sink) {
            self.last_report = report;
        }
        SceneCommand::None
    }

    fn view(&self, window_size: (u32, u32)) -> SceneView {
        let viewport = ViewportPx::new(window_size.0 as f32, window_size.1 as f32);
        let mut shapes = Vec::with_capacity(self.sim.zones().len() + 2);

        for zone in self.sim.zones().iter() {
            if let ZoneShape::Circle {
                center_pct,
                radius_px,
            } = zone.shape
            {
                shapes.push(ViewShape::Circle {
                    center_px: viewport.pct_to_px(center_pct),
                    radius_px,
                    filled: false,
                    style: zone_style(&self.last_report, zone.id),
                });
            }
        }

        if let Some(target_pct) = self.sim.movement().homing_target() {
            shapes.push(ViewShape::Cross {
                center_px: viewport.pct_to_px(target_pct),
                half_size_px: HOMING_MARKER_HALF_SIZE_PX,
                style: ShapeStyle::Marker,
            });
        }

        let position = self.last_report.position;
        shapes.push(ViewShape::Circle {
            center_px: viewport.pct_to_px(Vec2::new(position.x, position.y)),
            radius_px: self.sim.body().diameter_px * 0.5,
            filled: true,
            style: ShapeStyle::Agent,
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
        Some(dwell_title(
            "Lobby",
            &self.last_report,
            self.sim.zones(),
            &self.sink,
        ))
    }

    fn status(&self) -> SceneStatus {
        SceneStatus::from_report(&self.last_report, self.sink.fired())
    }
}
