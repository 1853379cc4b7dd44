use super::geometry::{box_contains_horizontal, Vec2, Vec3};
use super::simulation::{Movement, MovementIntent};
use super::zone::ZoneShape;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkerSettings {
    pub speed: f32,
    pub sprint_speed: f32,
    pub crouch_amount: f32,
    pub jump_height: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub ease_rate: f32,
    pub baseline_height: f32,
    pub turn_speed: f32,
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            sprint_speed: 10.0,
            crouch_amount: 0.5,
            jump_height: 30.0,
            gravity: 1.0,
            terminal_velocity: -2.0,
            ease_rate: 5.0,
            baseline_height: 1.6,
            turn_speed: 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalState {
    pub velocity: f32,
    pub baseline: f32,
    pub airborne: bool,
    pub crouching: bool,
}

impl VerticalState {
    pub fn resting_at(baseline: f32) -> Self {
        Self {
            velocity: 0.0,
            baseline,
            airborne: false,
            crouching: false,
        }
    }

    pub fn lowest(&self, settings: &WalkerSettings) -> f32 {
        self.baseline - settings.crouch_amount
    }

    pub fn target_height(&self, settings: &WalkerSettings) -> f32 {
        if self.crouching {
            self.lowest(settings)
        } else {
            self.baseline
        }
    }

    /// Starts a jump. No-op while airborne or crouched.
    ///
    /// The lift itself is applied by [`VerticalState::step`] on every airborne tick.
    pub fn try_jump(&mut self) -> bool {
        if self.airborne || self.crouching {
            return false;
        }
        self.airborne = true;
        self.velocity = 0.0;
        true
    }

    /// Gravity, crouch easing and the height clamp for one tick.
    pub fn step(&mut self, height: &mut f32, settings: &WalkerSettings, dt_seconds: f32) {
        if self.airborne {
            let lift = settings.jump_height * settings.gravity * dt_seconds;
            self.velocity = (self.velocity + lift - settings.gravity * dt_seconds)
                .max(settings.terminal_velocity);
        } else {
            self.velocity = (-settings.gravity).max(settings.terminal_velocity);
        }

        let target = self.target_height(settings);
        let ease = (settings.ease_rate * dt_seconds).clamp(0.0, 1.0);
        *height += (target - *height) * ease;
        *height += self.velocity * dt_seconds;

        let lowest = self.lowest(settings);
        if *height < lowest {
            *height = lowest;
        }
        if *height >= self.baseline {
            *height = self.baseline;
            if self.airborne {
                self.airborne = false;
                self.velocity = 0.0;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkerBody {
    pub position: Vec3,
    /// Radians about +y; positive turns left.
    pub yaw: f32,
    pub vertical: VerticalState,
}

impl WalkerBody {
    pub fn standing_at(position: Vec3, settings: &WalkerSettings) -> Self {
        Self {
            position: Vec3 {
                y: settings.baseline_height,
                ..position
            },
            yaw: 0.0,
            vertical: VerticalState::resting_at(settings.baseline_height),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FreeVertical {
    settings: WalkerSettings,
}

impl FreeVertical {
    pub fn new(settings: WalkerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &WalkerSettings {
        &self.settings
    }
}

impl Movement for FreeVertical {
    type Body = WalkerBody;

    fn advance(&mut self, body: &mut WalkerBody, intent: &MovementIntent, dt_seconds: f32) {
        if !(dt_seconds.is_finite() && dt_seconds > 0.0) {
            return;
        }
        let settings = &self.settings;

        let mut turn = 0.0f32;
        if intent.turn_left {
            turn += 1.0;
        }
        if intent.turn_right {
            turn -= 1.0;
        }
        body.yaw = wrap_angle(body.yaw + turn * settings.turn_speed * dt_seconds);

        body.vertical.crouching = intent.crouch;
        if intent.jump {
            body.vertical.try_jump();
        }

        if let Some(local) = local_direction(intent) {
            let base_speed = if intent.sprint {
                settings.sprint_speed
            } else {
                settings.speed
            };
            let speed = if body.vertical.crouching {
                base_speed * 0.5
            } else {
                base_speed
            };
            let world = rotate_by_yaw(local, body.yaw);
            body.position.x += world.x * speed * dt_seconds;
            body.position.z += world.y * speed * dt_seconds;
        }

        body.vertical.step(&mut body.position.y, settings, dt_seconds);
    }

    fn overlaps(&self, body: &WalkerBody, shape: &ZoneShape) -> bool {
        match *shape {
            ZoneShape::Box {
                center,
                half_extents,
                ..
            } => box_contains_horizontal(center, half_extents, body.position),
            ZoneShape::Circle { .. } => false,
        }
    }

    fn report_position(&self, body: &WalkerBody) -> Vec3 {
        body.position
    }
}

/// Local (strafe, depth) direction; forward is -z. `None` when no net input.
fn local_direction(intent: &MovementIntent) -> Option<Vec2> {
    let mut x = 0.0f32;
    let mut z = 0.0f32;
    if intent.forward {
        z -= 1.0;
    }
    if intent.back {
        z += 1.0;
    }
    if intent.left {
        x -= 1.0;
    }
    if intent.right {
        x += 1.0;
    }
    Vec2::new(x, z).try_normalize()
}

/// Rotates an (x, z) pair about +y. Output is (x, z) packed in a `Vec2`.
fn rotate_by_yaw(local: Vec2, yaw: f32) -> Vec2 {
    let (sin, cos) = yaw.sin_cos();
    Vec2 {
        x: local.x * cos + local.y * sin,
        y: -local.x * sin + local.y * cos,
    }
}

fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
