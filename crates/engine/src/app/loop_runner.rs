use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::config::ConfigError;
use crate::sim::Vec2;
use crate::StartupError;

use super::input::InputTracker;
use super::metrics::MetricsAccumulator;
use super::scene::SceneMachine;
use super::{InputSnapshot, PresentationHandle, Renderer, Scene, SceneCommand, SceneKey};

pub const SLOW_FRAME_ENV_VAR: &str = "DWELLNAV_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub initial_scene: SceneKey,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Dwell Navigation".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            initial_scene: SceneKey::Lobby,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    lobby: Box<dyn Scene>,
    gallery: Box<dyn Scene>,
) -> Result<(), AppError> {
    run_app_with_presentation(config, lobby, gallery, PresentationHandle::default())
}

pub fn run_app_with_presentation(
    config: LoopConfig,
    lobby: Box<dyn Scene>,
    gallery: Box<dyn Scene>,
    presentation: PresentationHandle,
) -> Result<(), AppError> {
    let mut scenes = SceneMachine::new(lobby, gallery, config.initial_scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let frame_budget = render_frame_budget(config.max_render_fps);
    let initial_size = window.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height);
    scenes.load_active();
    info!(scene = ?scenes.active_scene(), "scene_loaded");

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_frame_budget = ?frame_budget,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_physical_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if slow_frame_delay > Duration::ZERO {
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = scenes.update_active(fixed_dt_seconds, &input_snapshot);
                        if let SceneCommand::SwitchTo(next_scene) = command {
                            if scenes.switch_to(next_scene) {
                                info!(scene = ?scenes.active_scene(), "scene_switched");
                            }
                        }
                        metrics_accumulator.record_tick();
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let status = scenes.status_active();
                    presentation.publish_scene_status(status);

                    // Single sleep point for the render cap.
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    if let Some(pause) =
                        render_cap_pause(elapsed_since_last_present, frame_budget)
                    {
                        thread::sleep(pause);
                    }

                    let viewport = renderer.viewport();
                    let view = scenes.view_active((viewport.width, viewport.height));
                    if let Err(error) = renderer.render_view(&view) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = scenes.debug_title_active();
                    if next_title != last_applied_title {
                        if let Some(title) = &next_title {
                            window.set_title(title);
                        } else {
                            window.set_title(&config.window_title);
                        }
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        presentation.publish_loop_metrics(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            scene = ?scenes.active_scene(),
                            armed_zone = ?status.armed_zone,
                            navigations_fired = status.navigations_fired,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    tab_is_down: bool,
    switch_scene_pressed_edge: bool,
    tracker: InputTracker,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        self.handle_key_state(code == KeyCode::Tab, state);
        match state {
            ElementState::Pressed => {
                self.tracker.on_key_down(code);
                if code == KeyCode::Escape {
                    self.mark_quit_requested();
                }
            }
            ElementState::Released => self.tracker.on_key_up(code),
        }
    }

    fn handle_key_state(&mut self, is_tab: bool, state: ElementState) {
        if !is_tab {
            return;
        }

        match state {
            ElementState::Pressed => {
                if !self.tab_is_down {
                    self.switch_scene_pressed_edge = true;
                }
                self.tab_is_down = true;
            }
            ElementState::Released => self.tab_is_down = false,
        }
    }

    /// Focus loss: the window will not see the matching key-up events.
    fn release_all(&mut self) {
        self.tracker.clear();
        self.tab_is_down = false;
        self.left_mouse_is_down = false;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.switch_scene_pressed_edge,
            self.tracker.sample(),
            self.cursor_position_px,
            self.left_click_pressed_edge,
            self.window_width,
            self.window_height,
        );
        self.switch_scene_pressed_edge = false;
        self.left_click_pressed_edge = false;
        snapshot
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.left_click_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::replace(&mut accumulator, Duration::ZERO)
    } else {
        Duration::ZERO
    };

    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

/// Minimum time between presents; a missing or zero cap means uncapped.
fn render_frame_budget(max_render_fps: Option<u32>) -> Option<Duration> {
    let fps = max_render_fps.filter(|fps| *fps > 0)?;
    Some(Duration::from_nanos(1_000_000_000 / u64::from(fps)))
}

fn render_cap_pause(since_last_present: Duration, budget: Option<Duration>) -> Option<Duration> {
    budget?
        .checked_sub(since_last_present)
        .filter(|pause| !pause.is_zero())
}

fn resolve_slow_frame_delay(configured_ms: u64) -> Duration {
    let override_value = match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, %error, "slow-frame override unreadable");
            None
        }
    };
    slow_frame_delay(override_value.as_deref(), configured_ms)
}

/// The env override wins when it parses as milliseconds; otherwise the configured value applies.
fn slow_frame_delay(override_value: Option<&str>, configured_ms: u64) -> Duration {
    let override_ms = override_value.and_then(|raw| match raw.trim().parse::<u64>() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, value = raw, "slow-frame override ignored");
            None
        }
    });
    Duration::from_millis(override_ms.unwrap_or(configured_ms))
}
