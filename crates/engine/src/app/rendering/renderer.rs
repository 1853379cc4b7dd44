use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{SceneView, ShapeStyle, ViewShape};
use crate::sim::Vec2;

use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const ZONE_COLOR: [u8; 4] = [90, 110, 140, 255];
const ARMED_ZONE_COLOR: [u8; 4] = [255, 210, 70, 255];
const FIRED_ZONE_COLOR: [u8; 4] = [120, 230, 120, 255];
const AGENT_COLOR: [u8; 4] = [220, 220, 240, 255];
const MARKER_COLOR: [u8; 4] = [255, 120, 120, 255];
const COUNTDOWN_TRACK_COLOR: [u8; 4] = [40, 44, 54, 255];
const COUNTDOWN_BAR_HEIGHT_PX: i32 = 6;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_view(&mut self, view: &SceneView) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let width = self.viewport.width;
        let height = self.viewport.height;
        let frame = self.pixels.frame_mut();
        draw_view(frame, width, height, view);
        self.pixels.render()
    }
}

fn draw_view(frame: &mut [u8], width: u32, height: u32, view: &SceneView) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }

    for shape in &view.shapes {
        match *shape {
            ViewShape::Circle {
                center_px,
                radius_px,
                filled,
                style,
            } => {
                if filled {
                    draw_filled_circle(frame, width, height, center_px, radius_px, color_for(style));
                } else {
                    draw_circle_outline(frame, width, height, center_px, radius_px, color_for(style));
                }
            }
            ViewShape::Quad { corners_px, style } => {
                for index in 0..corners_px.len() {
                    let next = (index + 1) % corners_px.len();
                    draw_line(
                        frame,
                        width,
                        height,
                        corners_px[index],
                        corners_px[next],
                        color_for(style),
                    );
                }
            }
            ViewShape::Cross {
                center_px,
                half_size_px,
                style,
            } => draw_cross(
                frame,
                width,
                center_px.x.round() as i32,
                center_px.y.round() as i32,
                half_size_px.round() as i32,
                color_for(style),
            ),
        }
    }

    if let Some(fraction) = view.countdown_fraction {
        draw_countdown_bar(frame, width, fraction);
    }
}

fn color_for(style: ShapeStyle) -> [u8; 4] {
    match style {
        ShapeStyle::Zone => ZONE_COLOR,
        ShapeStyle::ArmedZone => ARMED_ZONE_COLOR,
        ShapeStyle::FiredZone => FIRED_ZONE_COLOR,
        ShapeStyle::Agent => AGENT_COLOR,
        ShapeStyle::Marker => MARKER_COLOR,
    }
}

fn countdown_bar_width_px(width: u32, fraction: f32) -> i32 {
    if !fraction.is_finite() {
        return 0;
    }
    (width as f32 * fraction.clamp(0.0, 1.0)).round() as i32
}

fn draw_countdown_bar(frame: &mut [u8], width: u32, fraction: f32) {
    let filled = countdown_bar_width_px(width, fraction);
    for y in 0..COUNTDOWN_BAR_HEIGHT_PX {
        for x in 0..width as i32 {
            let color = if x < filled {
                ARMED_ZONE_COLOR
            } else {
                COUNTDOWN_TRACK_COLOR
            };
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_filled_circle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    center: Vec2,
    radius: f32,
    color: [u8; 4],
) {
    if !(radius.is_finite() && radius > 0.0) {
        return;
    }
    let top = ((center.y - radius).floor() as i32).max(0);
    let bottom = ((center.y + radius).ceil() as i32).min(height as i32 - 1);
    let radius_sq = radius * radius;
    for y in top..=bottom {
        let dy = y as f32 + 0.5 - center.y;
        let span_sq = radius_sq - dy * dy;
        if span_sq < 0.0 {
            continue;
        }
        let span = span_sq.sqrt();
        let left = ((center.x - span).round() as i32).max(0);
        let right = ((center.x + span).round() as i32).min(width as i32);
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_circle_outline(
    frame: &mut [u8],
    width: u32,
    _height: u32,
    center: Vec2,
    radius: f32,
    color: [u8; 4],
) {
    if !(radius.is_finite() && radius > 0.0) {
        return;
    }
    let steps = ((radius * std::f32::consts::TAU).ceil() as usize).max(8);
    for step in 0..steps {
        let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
        let (sin, cos) = angle.sin_cos();
        let x = (center.x + cos * radius).round() as i32;
        let y = (center.y + sin * radius).round() as i32;
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn draw_line(frame: &mut [u8], width: u32, height: u32, from: Vec2, to: Vec2, color: [u8; 4]) {
    let Some((from, to)) = clip_segment(from, to, width, height) else {
        return;
    };
    let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
    let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        write_pixel_rgba_clipped(frame, width as usize, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x0 += sx;
        }
        if doubled <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Liang-Barsky clip of a segment to the pixel rectangle `[0, width - 1] x [0, height - 1]`.
fn clip_segment(from: Vec2, to: Vec2, width: u32, height: u32) -> Option<(Vec2, Vec2)> {
    let finite = [from.x, from.y, to.x, to.y].iter().all(|value| value.is_finite());
    if width == 0 || height == 0 || !finite {
        return None;
    }
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let mut enter = 0.0f32;
    let mut exit = 1.0f32;

    for (p, q) in [
        (-dx, from.x),
        (dx, max_x - from.x),
        (-dy, from.y),
        (dy, max_y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
        if enter > exit {
            return None;
        }
    }

    let at = |t: f32| Vec2::new(from.x + dx * t, from.y + dy * t);
    Some((at(enter), at(exit)))
}

fn draw_cross(frame: &mut [u8], width: u32, cx: i32, cy: i32, half_size: i32, color: [u8; 4]) {
    for x in (cx - half_size)..=(cx + half_size) {
        write_pixel_rgba_clipped(frame, width as usize, x, cy, color);
    }
    for y in (cy - half_size)..=(cy + half_size) {
        write_pixel_rgba_clipped(frame, width as usize, cx, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
