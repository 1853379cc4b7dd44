mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{action_for_key, InputAction, InputTracker};
pub use loop_runner::{
    run_app, run_app_with_presentation, AppError, LoopConfig, SLOW_FRAME_ENV_VAR,
};
pub use metrics::{LoopMetricsSnapshot, PresentationHandle, PresentationSnapshot};
pub use rendering::{box_footprint, world_to_screen, Renderer, Viewport, PIXELS_PER_WORLD};
pub use scene::{
    InputSnapshot, Scene, SceneCommand, SceneKey, SceneStatus, SceneView, ShapeStyle, ViewShape,
};
