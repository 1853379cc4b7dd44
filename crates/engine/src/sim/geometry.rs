#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        Vec2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
        .length()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn try_normalize(self) -> Option<Vec2> {
        let len_sq = self.x * self.x + self.y * self.y;
        if len_sq > 0.0 && len_sq.is_finite() {
            let inv_len = len_sq.sqrt().recip();
            Some(Vec2 {
                x: self.x * inv_len,
                y: self.y * inv_len,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Agent is inside only when its whole body fits within the zone:
/// `distance <= zone_radius - agent_radius`.
pub fn circle_contains(
    zone_center: Vec2,
    zone_radius: f32,
    agent_center: Vec2,
    agent_radius: f32,
) -> bool {
    let distance = zone_center.distance(agent_center);
    distance <= zone_radius - agent_radius
}

/// Inclusive containment on x and z. The y axis (eye height) is not compared
/// and any zone rotation is ignored.
pub fn box_contains_horizontal(center: Vec3, half_extents: Vec3, point: Vec3) -> bool {
    within(point.x, center.x, half_extents.x) && within(point.z, center.z, half_extents.z)
}

fn within(value: f32, center: f32, half_extent: f32) -> bool {
    value >= center - half_extent && value <= center + half_extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_contains_requires_whole_body_inside() {
        let zone = Vec2::new(100.0, 100.0);

        assert!(circle_contains(zone, 40.0, Vec2::new(115.0, 100.0), 20.0));
        assert!(!circle_contains(zone, 40.0, Vec2::new(125.0, 100.0), 20.0));
    }

    #[test]
    fn circle_contains_boundary_is_inclusive() {
        let zone = Vec2::new(0.0, 0.0);
        assert!(circle_contains(zone, 40.0, Vec2::new(0.0, 20.0), 20.0));
    }

    #[test]
    fn circle_agent_larger_than_zone_never_fits() {
        let zone = Vec2::new(0.0, 0.0);
        assert!(!circle_contains(zone, 10.0, zone, 20.0));
    }

    #[test]
    fn box_contains_uses_half_extents() {
        let half = Vec3::new(1.0, 2.0, 2.0);

        assert!(box_contains_horizontal(
            Vec3::ZERO,
            half,
            Vec3::new(0.9, 0.0, 0.0)
        ));
        assert!(!box_contains_horizontal(
            Vec3::ZERO,
            half,
            Vec3::new(1.1, 0.0, 0.0)
        ));
    }

    #[test]
    fn box_contains_ignores_eye_height() {
        let half = Vec3::new(1.0, 2.0, 2.0);
        assert!(box_contains_horizontal(
            Vec3::new(10.0, 0.0, 10.0),
            half,
            Vec3::new(10.5, 25.0, 11.5)
        ));
        assert!(!box_contains_horizontal(
            Vec3::new(10.0, 0.0, 10.0),
            half,
            Vec3::new(10.5, 0.0, 12.5)
        ));
    }

    #[test]
    fn try_normalize_guards_zero_vector() {
        assert_eq!(Vec2::ZERO.try_normalize(), None);

        let unit = Vec2::new(1.0, -1.0).try_normalize().expect("unit");
        assert!((unit.length() - 1.0).abs() < 0.000_1);
        assert!((unit.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.000_1);
    }
}
