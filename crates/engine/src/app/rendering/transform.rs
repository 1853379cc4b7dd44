use crate::sim::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Top-down projection of the horizontal plane: +x to the right, -z up the
/// screen. `camera` holds the (x, z) point drawn at the viewport center.
pub fn world_to_screen(
    world: Vec3,
    camera: Vec2,
    viewport: Viewport,
    pixels_per_world: f32,
) -> Vec2 {
    Vec2 {
        x: (world.x - camera.x) * pixels_per_world + viewport.width as f32 * 0.5,
        y: (world.z - camera.y) * pixels_per_world + viewport.height as f32 * 0.5,
    }
}

/// Horizontal corners of a box rotated about +y, in winding order.
pub fn box_footprint(center: Vec3, half_extents: Vec3, rotation_y: f32) -> [Vec3; 4] {
    let (sin, cos) = rotation_y.sin_cos();
    let rotate = |x: f32, z: f32| Vec3 {
        x: center.x + x * cos + z * sin,
        y: center.y,
        z: center.z - x * sin + z * cos,
    };
    let hx = half_extents.x;
    let hz = half_extents.z;
    [
        rotate(-hx, -hz),
        rotate(hx, -hz),
        rotate(hx, hz),
        rotate(-hx, hz),
    ]
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn camera_point_maps_to_viewport_center() {
        let screen = world_to_screen(
            Vec3::new(3.0, 9.0, -2.0),
            Vec2::new(3.0, -2.0),
            VIEWPORT,
            32.0,
        );
        assert_eq!(screen, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn forward_is_up_the_screen() {
        let screen = world_to_screen(Vec3::new(1.0, 0.0, -1.0), Vec2::ZERO, VIEWPORT, 10.0);
        assert_eq!(screen, Vec2::new(410.0, 290.0));
    }

    #[test]
    fn unrotated_footprint_matches_extents() {
        let corners = box_footprint(Vec3::new(10.0, 0.0, 10.0), Vec3::new(1.0, 2.0, 2.0), 0.0);
        assert_eq!(corners[0], Vec3::new(9.0, 0.0, 8.0));
        assert_eq!(corners[2], Vec3::new(11.0, 0.0, 12.0));
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let corners = box_footprint(Vec3::ZERO, Vec3::new(1.0, 0.0, 2.0), FRAC_PI_2);
        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        let max_z = corners.iter().map(|c| c.z).fold(f32::MIN, f32::max);
        assert!((max_x - 2.0).abs() < 0.000_1);
        assert!((max_z - 1.0).abs() < 0.000_1);
    }
}
