mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{box_footprint, world_to_screen, Viewport};

pub const PIXELS_PER_WORLD: f32 = 20.0;
