use super::geometry::{circle_contains, Vec2, Vec3};
use super::simulation::{Movement, MovementIntent};
use super::zone::ZoneShape;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPx {
    pub width: f32,
    pub height: f32,
}

impl ViewportPx {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn pct_to_px(self, pct: Vec2) -> Vec2 {
        Vec2 {
            x: pct.x / 100.0 * self.width,
            y: pct.y / 100.0 * self.height,
        }
    }

    /// Returns `None` for a degenerate viewport.
    pub fn px_to_pct(self, px: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2 {
            x: px.x / self.width * 100.0,
            y: px.y / self.height * 100.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBody {
    pub position_pct: Vec2,
    pub diameter_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarSettings {
    pub speed: f32,
    /// Fixed per-tick multiplier applied instead of the raw frame delta.
    pub delta_scale: f32,
    pub homing_rate: f32,
    pub homing_stop_distance: f32,
}

impl Default for PlanarSettings {
    fn default() -> Self {
        Self {
            speed: 0.35,
            delta_scale: 10.0,
            homing_rate: 0.01,
            homing_stop_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClampedPlanar {
    settings: PlanarSettings,
    viewport: ViewportPx,
    homing_target: Option<Vec2>,
}

impl ClampedPlanar {
    pub fn new(settings: PlanarSettings, viewport: ViewportPx) -> Self {
        Self {
            settings,
            viewport,
            homing_target: None,
        }
    }

    pub fn settings(&self) -> PlanarSettings {
        self.settings
    }

    pub fn viewport(&self) -> ViewportPx {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportPx) {
        self.viewport = viewport;
    }

    pub fn homing_target(&self) -> Option<Vec2> {
        self.homing_target
    }

    pub fn set_homing_target(&mut self, target_pct: Option<Vec2>) {
        self.homing_target = target_pct;
    }
}

impl Movement for ClampedPlanar {
    type Body = PlanarBody;

    fn advance(&mut self, body: &mut PlanarBody, intent: &MovementIntent, dt_seconds: f32) {
        if !(dt_seconds.is_finite() && dt_seconds > 0.0) {
            return;
        }

        if intent.has_direction() {
            self.homing_target = None;
            if let Some(direction) = planar_direction(intent) {
                body.position_pct = keyboard_step(
                    body.position_pct,
                    direction,
                    self.settings.speed * self.settings.delta_scale,
                    self.viewport,
                    body.diameter_px,
                );
            }
            return;
        }

        if let Some(target) = self.homing_target {
            let next = homing_step(
                body.position_pct,
                target,
                self.settings.speed,
                self.settings.homing_rate,
                self.settings.homing_stop_distance,
            );
            if next != body.position_pct {
                body.position_pct = clamp_position_pct(next, self.viewport, body.diameter_px);
            }
        }
    }

    fn overlaps(&self, body: &PlanarBody, shape: &ZoneShape) -> bool {
        match *shape {
            ZoneShape::Circle {
                center_pct,
                radius_px,
            } => circle_contains(
                self.viewport.pct_to_px(center_pct),
                radius_px,
                self.viewport.pct_to_px(body.position_pct),
                body.diameter_px * 0.5,
            ),
            ZoneShape::Box { .. } => false,
        }
    }

    fn report_position(&self, body: &PlanarBody) -> Vec3 {
        Vec3::new(body.position_pct.x, body.position_pct.y, 0.0)
    }
}

/// Screen-space direction (y grows downward), unit length or `None`.
pub fn planar_direction(intent: &MovementIntent) -> Option<Vec2> {
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    if intent.forward {
        y -= 1.0;
    }
    if intent.back {
        y += 1.0;
    }
    if intent.left {
        x -= 1.0;
    }
    if intent.right {
        x += 1.0;
    }
    Vec2::new(x, y).try_normalize()
}

pub fn keyboard_step(
    position_pct: Vec2,
    direction: Vec2,
    stride_px: f32,
    viewport: ViewportPx,
    diameter_px: f32,
) -> Vec2 {
    Vec2 {
        x: step_axis(position_pct.x, direction.x * stride_px, viewport.width, diameter_px),
        y: step_axis(position_pct.y, direction.y * stride_px, viewport.height, diameter_px),
    }
}

fn step_axis(pct: f32, delta_px: f32, extent_px: f32, diameter_px: f32) -> f32 {
    if extent_px.is_nan() || extent_px <= 0.0 {
        return pct;
    }
    let max_px = (extent_px - diameter_px).max(0.0);
    let next_px = pct / 100.0 * extent_px + delta_px;
    next_px.clamp(0.0, max_px) / extent_px * 100.0
}

/// Pulls a position back inside `[0, extent - diameter]`; in-bounds positions
/// come back bit-identical.
pub fn clamp_position_pct(position_pct: Vec2, viewport: ViewportPx, diameter_px: f32) -> Vec2 {
    Vec2 {
        x: clamp_axis(position_pct.x, viewport.width, diameter_px),
        y: clamp_axis(position_pct.y, viewport.height, diameter_px),
    }
}

fn clamp_axis(pct: f32, extent_px: f32, diameter_px: f32) -> f32 {
    if extent_px.is_nan() || extent_px <= 0.0 {
        return pct;
    }
    let max_px = (extent_px - diameter_px).max(0.0);
    let px = pct / 100.0 * extent_px;
    if (0.0..=max_px).contains(&px) {
        pct
    } else {
        px.clamp(0.0, max_px) / extent_px * 100.0
    }
}

/// Moves `speed` toward the target, then closes `rate` of what is left.
/// Within `stop_distance` the position is returned unchanged.
pub fn homing_step(position: Vec2, target: Vec2, speed: f32, rate: f32, stop_distance: f32) -> Vec2 {
    let dx = target.x - position.x;
    let dy = target.y - position.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if !distance.is_finite() || distance < stop_distance || distance <= 0.0 {
        return position;
    }

    let stride = speed.max(0.0).min(distance);
    let inv_distance = distance.recip();
    let stepped = Vec2 {
        x: position.x + dx * inv_distance * stride,
        y: position.y + dy * inv_distance * stride,
    };

    let rate = rate.clamp(0.0, 1.0);
    Vec2 {
        x: stepped.x + (target.x - stepped.x) * rate,
        y: stepped.y + (target.y - stepped.y) * rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: ViewportPx = ViewportPx {
        width: 1000.0,
        height: 800.0,
    };
    const DIAMETER: f32 = 40.0;

    fn body_at(x: f32, y: f32) -> PlanarBody {
        PlanarBody {
            position_pct: Vec2::new(x, y),
            diameter_px: DIAMETER,
        }
    }

    fn intent(forward: bool, back: bool, left: bool, right: bool) -> MovementIntent {
        MovementIntent {
            forward,
            back,
            left,
            right,
            ..MovementIntent::default()
        }
    }

    fn displacement_px(before: Vec2, after: Vec2) -> f32 {
        let dx = (after.x - before.x) / 100.0 * VIEWPORT.width;
        let dy = (after.y - before.y) / 100.0 * VIEWPORT.height;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn axial_and_diagonal_steps_have_equal_length() {
        let settings = PlanarSettings::default();
        let expected = settings.speed * settings.delta_scale;
        let cases = [
            intent(true, false, false, false),
            intent(false, true, false, false),
            intent(false, false, true, false),
            intent(false, false, false, true),
            intent(true, false, true, false),
            intent(true, false, false, true),
            intent(false, true, true, false),
            intent(false, true, false, true),
        ];

        for case in cases {
            let mut movement = ClampedPlanar::new(settings, VIEWPORT);
            let mut body = body_at(50.0, 50.0);
            let before = body.position_pct;
            movement.advance(&mut body, &case, 1.0 / 60.0);
            let moved = displacement_px(before, body.position_pct);
            assert!(
                (moved - expected).abs() < 0.001,
                "{case:?} moved {moved} expected {expected}"
            );
        }
    }

    #[test]
    fn forward_moves_up_the_screen() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(50.0, 50.0);
        movement.advance(&mut body, &intent(true, false, false, false), 1.0 / 60.0);
        assert!(body.position_pct.y < 50.0);
        assert_eq!(body.position_pct.x, 50.0);
    }

    #[test]
    fn opposing_keys_cancel_out() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(50.0, 50.0);
        movement.advance(&mut body, &intent(true, true, true, true), 1.0 / 60.0);
        assert_eq!(body.position_pct, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn position_stays_within_clamped_bounds() {
        let settings = PlanarSettings {
            speed: 4.0,
            ..PlanarSettings::default()
        };
        let patterns = [
            intent(true, false, true, false),
            intent(false, true, false, true),
            intent(true, false, false, true),
            intent(false, true, true, false),
        ];
        let max_x = VIEWPORT.width - DIAMETER;
        let max_y = VIEWPORT.height - DIAMETER;

        for (index, pattern) in patterns.iter().enumerate() {
            let mut movement = ClampedPlanar::new(settings, VIEWPORT);
            let mut body = body_at(50.0, 50.0);
            for tick in 0..600 {
                let input = if (tick / 97) % 2 == index % 2 {
                    *pattern
                } else {
                    patterns[(index + tick / 53) % patterns.len()]
                };
                movement.advance(&mut body, &input, 1.0 / 60.0);
                let px = VIEWPORT.pct_to_px(body.position_pct);
                assert!(px.x >= 0.0 && px.x <= max_x + 0.001, "x {}", px.x);
                assert!(px.y >= 0.0 && px.y <= max_y + 0.001, "y {}", px.y);
            }
        }
    }

    #[test]
    fn rest_is_idempotent() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(33.3, 66.6);
        for _ in 0..100 {
            movement.advance(&mut body, &MovementIntent::default(), 1.0 / 60.0);
        }
        assert_eq!(body.position_pct, Vec2::new(33.3, 66.6));
    }

    #[test]
    fn paused_clock_produces_no_movement() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(50.0, 50.0);
        let input = intent(true, false, true, false);
        movement.advance(&mut body, &input, 0.0);
        movement.advance(&mut body, &input, -0.5);
        movement.advance(&mut body, &input, f32::NAN);
        assert_eq!(body.position_pct, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn degenerate_viewport_does_not_produce_nan() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), ViewportPx::new(0.0, 0.0));
        let mut body = body_at(50.0, 50.0);
        movement.advance(&mut body, &intent(false, false, false, true), 1.0 / 60.0);
        assert_eq!(body.position_pct, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn homing_approaches_monotonically_and_stops() {
        let target = Vec2::new(100.0, 100.0);
        let mut position = Vec2::new(0.0, 0.0);
        let mut last_distance = position.distance(target);
        let mut stopped_at = None;

        for tick in 0..2_000 {
            let next = homing_step(position, target, 0.35, 0.01, 1.0);
            assert!(next.x <= target.x && next.y <= target.y, "overshoot at {tick}");
            let distance = next.distance(target);
            if last_distance < 1.0 {
                assert_eq!(next, position, "moved after stopping at {tick}");
                stopped_at.get_or_insert(tick);
            } else {
                assert!(distance < last_distance, "not approaching at {tick}");
            }
            position = next;
            last_distance = distance;
        }

        assert!(stopped_at.is_some());
        assert!(position.distance(target) > 0.0);
    }

    #[test]
    fn homing_rate_alone_gives_exponential_approach() {
        let next = homing_step(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 0.0, 0.01, 1.0);
        assert!((next.x - 1.0).abs() < 0.000_1);
        assert_eq!(next.y, 0.0);
    }

    #[test]
    fn homing_target_drives_body_without_keys() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(10.0, 10.0);
        movement.set_homing_target(Some(Vec2::new(40.0, 40.0)));

        movement.advance(&mut body, &MovementIntent::default(), 1.0 / 60.0);
        assert!(body.position_pct.x > 10.0 && body.position_pct.y > 10.0);
        assert!(movement.homing_target().is_some());
    }

    #[test]
    fn directional_input_cancels_homing() {
        let mut movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let mut body = body_at(10.0, 10.0);
        movement.set_homing_target(Some(Vec2::new(40.0, 40.0)));

        movement.advance(&mut body, &intent(false, false, true, false), 1.0 / 60.0);
        assert!(movement.homing_target().is_none());
        assert!(body.position_pct.x < 10.0);
    }

    #[test]
    fn circle_overlap_uses_pixel_space() {
        let movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let zone = ZoneShape::Circle {
            center_pct: Vec2::new(50.0, 50.0),
            radius_px: 40.0,
        };

        // 15 px to the right of the zone center.
        let inside = body_at(51.5, 50.0);
        // 25 px to the right.
        let outside = body_at(52.5, 50.0);

        assert!(movement.overlaps(&inside, &zone));
        assert!(!movement.overlaps(&outside, &zone));
    }

    #[test]
    fn box_zones_never_overlap_planar_agent() {
        let movement = ClampedPlanar::new(PlanarSettings::default(), VIEWPORT);
        let zone = ZoneShape::Box {
            center: Vec3::ZERO,
            half_extents: Vec3::new(1000.0, 1000.0, 1000.0),
            rotation_y: 0.0,
        };
        assert!(!movement.overlaps(&body_at(0.0, 0.0), &zone));
    }

    #[test]
    fn cursor_pixels_convert_to_percent() {
        let pct = VIEWPORT.px_to_pct(Vec2::new(250.0, 100.0)).expect("viewport");
        let back = VIEWPORT.pct_to_px(pct);
        assert!((back.x - 250.0).abs() < 0.001);
        assert!((back.y - 100.0).abs() < 0.001);
        assert_eq!(ViewportPx::new(0.0, 480.0).px_to_pct(Vec2::ZERO), None);
    }
}
