use serde::Deserialize;

use super::input::{ActionStates, InputAction};
use crate::sim::{MovementIntent, TickReport, Vec2, Vec3, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKey {
    Lobby,
    Gallery,
}

impl SceneKey {
    pub fn other(self) -> Self {
        match self {
            SceneKey::Lobby => SceneKey::Gallery,
            SceneKey::Gallery => SceneKey::Lobby,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    switch_scene_pressed: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        switch_scene_pressed: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            switch_scene_pressed,
            actions,
            cursor_position_px,
            left_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn movement_intent(&self) -> MovementIntent {
        self.actions.movement_intent()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_switch_scene_pressed(mut self, switch_scene_pressed: bool) -> Self {
        self.switch_scene_pressed = switch_scene_pressed;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStyle {
    Zone,
    ArmedZone,
    FiredZone,
    Agent,
    Marker,
}

/// Screen-space primitives, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewShape {
    Circle {
        center_px: Vec2,
        radius_px: f32,
        filled: bool,
        style: ShapeStyle,
    },
    Quad {
        corners_px: [Vec2; 4],
        style: ShapeStyle,
    },
    Cross {
        center_px: Vec2,
        half_size_px: f32,
        style: ShapeStyle,
    },
}

/// Everything the renderer needs for one frame. Drawn back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneView {
    pub shapes: Vec<ViewShape>,
    /// Fraction of the dwell countdown still remaining while a zone is armed.
    pub countdown_fraction: Option<f32>,
}

/// Per-tick state a scene exposes to observers outside the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneStatus {
    pub position: Vec3,
    pub overlapping_zone: Option<ZoneId>,
    pub armed_zone: Option<ZoneId>,
    pub remaining_seconds: f32,
    pub remaining_display_seconds: u32,
    pub navigations_fired: u32,
}

impl SceneStatus {
    pub fn from_report(report: &TickReport, navigations_fired: u32) -> Self {
        Self {
            position: report.position,
            overlapping_zone: report.overlapping,
            armed_zone: report.armed_zone,
            remaining_seconds: report.remaining_seconds,
            remaining_display_seconds: report.remaining_display_seconds,
            navigations_fired,
        }
    }
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn view(&self, window_size: (u32, u32)) -> SceneView;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn status(&self) -> SceneStatus {
        SceneStatus::default()
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

pub(crate) struct SceneMachine {
    lobby: SceneRuntime,
    gallery: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        lobby: Box<dyn Scene>,
        gallery: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            lobby: SceneRuntime {
                scene: lobby,
                is_loaded: false,
            },
            gallery: SceneRuntime {
                scene: gallery,
                is_loaded: false,
            },
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        self.active_runtime_mut()
            .scene
            .update(fixed_dt_seconds, input)
    }

    pub(crate) fn view_active(&self, window_size: (u32, u32)) -> SceneView {
        self.active_runtime_ref().scene.view(window_size)
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        self.active_runtime_ref().scene.debug_title()
    }

    pub(crate) fn status_active(&self) -> SceneStatus {
        self.active_runtime_ref().scene.status()
    }

    /// Loads the target on first visit. Scenes keep their state across
    /// switches until `shutdown_all`.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.lobby, &mut self.gallery] {
            if runtime.is_loaded {
                runtime.scene.unload();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        let runtime = self.runtime_mut(key);
        if runtime.is_loaded {
            return;
        }
        runtime.scene.load();
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Lobby => &mut self.lobby,
            SceneKey::Gallery => &mut self.gallery,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Lobby => &self.lobby,
            SceneKey::Gallery => &self.gallery,
        }
    }
}
