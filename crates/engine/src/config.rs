use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::app::{LoopConfig, SceneKey};
use crate::sim::{
    DwellCadence, DwellTimer, PlanarSettings, Vec2, Vec3, WalkerSettings, Zone, ZoneId, ZoneSet,
    ZoneShape,
};
use crate::AppPaths;

pub const CONFIG_ENV_VAR: &str = "DWELLNAV_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read session config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session config {path} at {field}: {message}")]
    Parse {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("invalid session config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    EnvFile(PathBuf),
    AssetsFile(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Defaults => None,
            ConfigSource::EnvFile(path) | ConfigSource::AssetsFile(path) => Some(path),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PlanarConfig {
    pub speed: f32,
    pub delta_scale: f32,
    pub agent_diameter_px: f32,
    pub start_pct: [f32; 2],
    pub homing_rate: f32,
    pub homing_stop_distance: f32,
}

impl Default for PlanarConfig {
    fn default() -> Self {
        let settings = PlanarSettings::default();
        Self {
            speed: settings.speed,
            delta_scale: settings.delta_scale,
            agent_diameter_px: 40.0,
            start_pct: [50.0, 50.0],
            homing_rate: settings.homing_rate,
            homing_stop_distance: settings.homing_stop_distance,
        }
    }
}

impl PlanarConfig {
    pub fn settings(&self) -> PlanarSettings {
        PlanarSettings {
            speed: self.speed,
            delta_scale: self.delta_scale,
            homing_rate: self.homing_rate,
            homing_stop_distance: self.homing_stop_distance,
        }
    }

    pub fn start(&self) -> Vec2 {
        Vec2::new(self.start_pct[0], self.start_pct[1])
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WalkerConfig {
    pub speed: f32,
    pub sprint_speed: f32,
    pub crouch_amount: f32,
    pub jump_height: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    pub ease_rate: f32,
    pub baseline_height: f32,
    pub turn_speed: f32,
    pub start: [f32; 3],
}

impl Default for WalkerConfig {
    fn default() -> Self {
        let settings = WalkerSettings::default();
        Self {
            speed: settings.speed,
            sprint_speed: settings.sprint_speed,
            crouch_amount: settings.crouch_amount,
            jump_height: settings.jump_height,
            gravity: settings.gravity,
            terminal_velocity: settings.terminal_velocity,
            ease_rate: settings.ease_rate,
            baseline_height: settings.baseline_height,
            turn_speed: settings.turn_speed,
            start: [0.0, settings.baseline_height, 0.0],
        }
    }
}

impl WalkerConfig {
    pub fn settings(&self) -> WalkerSettings {
        WalkerSettings {
            speed: self.speed,
            sprint_speed: self.sprint_speed,
            crouch_amount: self.crouch_amount,
            jump_height: self.jump_height,
            gravity: self.gravity,
            terminal_velocity: self.terminal_velocity,
            ease_rate: self.ease_rate,
            baseline_height: self.baseline_height,
            turn_speed: self.turn_speed,
        }
    }

    pub fn start(&self) -> Vec3 {
        Vec3::new(self.start[0], self.start[1], self.start[2])
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum CadenceConfig {
    Continuous,
    Interval { period_seconds: f32 },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DwellConfig {
    pub duration_seconds: f32,
    pub cadence: CadenceConfig,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 3.0,
            cadence: CadenceConfig::Interval {
                period_seconds: 1.0,
            },
        }
    }
}

impl DwellConfig {
    pub fn timer(&self) -> DwellTimer {
        DwellTimer::new(self.duration_seconds, self.cadence())
    }

    pub fn cadence(&self) -> DwellCadence {
        match self.cadence {
            CadenceConfig::Continuous => DwellCadence::Continuous,
            CadenceConfig::Interval { period_seconds } => DwellCadence::Interval {
                period: Duration::try_from_secs_f32(period_seconds)
                    .unwrap_or(Duration::from_secs(1)),
            },
        }
    }
}

/// Host loop timing and window setup, read from the `loop` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta_ms: u64,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval_ms: u64,
    /// `None` renders as fast as the event loop allows.
    pub max_render_fps: Option<u32>,
    pub slow_frame_ms: u64,
    pub initial_scene: SceneKey,
}

impl Default for LoopSettings {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            window_width: defaults.window_width,
            window_height: defaults.window_height,
            target_tps: defaults.target_tps,
            max_frame_delta_ms: defaults.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame: defaults.max_ticks_per_frame,
            metrics_log_interval_ms: defaults.metrics_log_interval.as_millis() as u64,
            max_render_fps: defaults.max_render_fps,
            slow_frame_ms: defaults.simulated_slow_frame_ms,
            initial_scene: defaults.initial_scene,
        }
    }
}

impl LoopSettings {
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            max_frame_delta: Duration::from_millis(self.max_frame_delta_ms),
            max_ticks_per_frame: self.max_ticks_per_frame,
            metrics_log_interval: Duration::from_millis(self.metrics_log_interval_ms),
            simulated_slow_frame_ms: self.slow_frame_ms,
            max_render_fps: self.max_render_fps,
            initial_scene: self.initial_scene,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("loop.window_width", u64::from(self.window_width)),
            ("loop.window_height", u64::from(self.window_height)),
            ("loop.target_tps", u64::from(self.target_tps)),
            ("loop.max_frame_delta_ms", self.max_frame_delta_ms),
            ("loop.max_ticks_per_frame", u64::from(self.max_ticks_per_frame)),
            ("loop.metrics_log_interval_ms", self.metrics_log_interval_ms),
        ];
        if let Some((field, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{field} must be > 0")));
        }
        if self.max_render_fps == Some(0) {
            return Err(ConfigError::Invalid(
                "loop.max_render_fps must be > 0 or null".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CircleZoneConfig {
    pub id: u32,
    pub label: String,
    pub target: String,
    pub center_pct: [f32; 2],
    pub radius_px: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoxZoneConfig {
    pub id: u32,
    pub label: String,
    pub target: String,
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    #[serde(default)]
    pub rotation_y: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(rename = "loop")]
    pub host_loop: LoopSettings,
    pub planar: PlanarConfig,
    pub walker: WalkerConfig,
    pub dwell: DwellConfig,
    pub circle_zones: Vec<CircleZoneConfig>,
    pub box_zones: Vec<BoxZoneConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host_loop: LoopSettings::default(),
            planar: PlanarConfig::default(),
            walker: WalkerConfig::default(),
            dwell: DwellConfig::default(),
            circle_zones: default_circle_zones(),
            box_zones: default_box_zones(),
        }
    }
}

impl SessionConfig {
    pub fn circle_zone_set(&self) -> ZoneSet {
        ZoneSet::new(
            self.circle_zones
                .iter()
                .map(|zone| Zone {
                    id: ZoneId(zone.id),
                    label: zone.label.clone(),
                    target: zone.target.clone(),
                    shape: ZoneShape::Circle {
                        center_pct: Vec2::new(zone.center_pct[0], zone.center_pct[1]),
                        radius_px: zone.radius_px,
                    },
                })
                .collect(),
        )
    }

    pub fn box_zone_set(&self) -> ZoneSet {
        ZoneSet::new(
            self.box_zones
                .iter()
                .map(|zone| Zone {
                    id: ZoneId(zone.id),
                    label: zone.label.clone(),
                    target: zone.target.clone(),
                    shape: ZoneShape::Box {
                        center: Vec3::new(zone.center[0], zone.center[1], zone.center[2]),
                        half_extents: Vec3::new(
                            zone.half_extents[0],
                            zone.half_extents[1],
                            zone.half_extents[2],
                        ),
                        rotation_y: zone.rotation_y,
                    },
                })
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.host_loop.validate()?;
        require_positive("planar.speed", self.planar.speed)?;
        require_positive("planar.delta_scale", self.planar.delta_scale)?;
        require_positive("planar.agent_diameter_px", self.planar.agent_diameter_px)?;
        require_in_unit_range("planar.homing_rate", self.planar.homing_rate)?;
        require_non_negative(
            "planar.homing_stop_distance",
            self.planar.homing_stop_distance,
        )?;
        require_finite_all("planar.start_pct", &self.planar.start_pct)?;

        require_positive("walker.speed", self.walker.speed)?;
        require_positive("walker.sprint_speed", self.walker.sprint_speed)?;
        require_non_negative("walker.crouch_amount", self.walker.crouch_amount)?;
        require_non_negative("walker.jump_height", self.walker.jump_height)?;
        require_non_negative("walker.gravity", self.walker.gravity)?;
        if !(self.walker.terminal_velocity.is_finite() && self.walker.terminal_velocity <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "walker.terminal_velocity must be finite and <= 0, got {}",
                self.walker.terminal_velocity
            )));
        }
        require_positive("walker.ease_rate", self.walker.ease_rate)?;
        require_finite_all("walker.baseline_height", &[self.walker.baseline_height])?;
        require_non_negative("walker.turn_speed", self.walker.turn_speed)?;
        require_finite_all("walker.start", &self.walker.start)?;

        require_positive("dwell.duration_seconds", self.dwell.duration_seconds)?;
        if let CadenceConfig::Interval { period_seconds } = self.dwell.cadence {
            require_positive("dwell.cadence.period_seconds", period_seconds)?;
        }

        let mut seen = HashSet::new();
        for zone in &self.circle_zones {
            let scope = format!("circle_zones[id={}]", zone.id);
            require_zone_identity(&scope, &zone.target, &mut seen, zone.id)?;
            require_finite_all(&format!("{scope}.center_pct"), &zone.center_pct)?;
            require_positive(&format!("{scope}.radius_px"), zone.radius_px)?;
        }

        let mut seen = HashSet::new();
        for zone in &self.box_zones {
            let scope = format!("box_zones[id={}]", zone.id);
            require_zone_identity(&scope, &zone.target, &mut seen, zone.id)?;
            require_finite_all(&format!("{scope}.center"), &zone.center)?;
            for (axis, value) in ["x", "y", "z"].iter().zip(zone.half_extents) {
                require_positive(&format!("{scope}.half_extents.{axis}"), value)?;
            }
            require_finite_all(&format!("{scope}.rotation_y"), &[zone.rotation_y])?;
        }

        Ok(())
    }
}

/// `DWELLNAV_CONFIG` wins; otherwise `assets/session.json` when present;
/// otherwise built-in defaults.
/// Without project paths only `DWELLNAV_CONFIG` or the built-in defaults apply.
pub fn resolve_session_config(
    paths: Option<&AppPaths>,
) -> Result<(SessionConfig, ConfigSource), ConfigError> {
    let env_path = match env::var(CONFIG_ENV_VAR) {
        Ok(value) => Some(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => None,
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            })
        }
    };

    let source = select_config_source(env_path, paths.map(|paths| paths.assets_dir.as_path()));
    let config = match source.path() {
        Some(path) => load_session_config(path)?,
        None => SessionConfig::default(),
    };
    info!(
        source = ?source,
        circle_zones = config.circle_zones.len(),
        box_zones = config.box_zones.len(),
        dwell_seconds = config.dwell.duration_seconds,
        "config_loaded"
    );
    Ok((config, source))
}

fn select_config_source(env_path: Option<PathBuf>, assets_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = env_path {
        return ConfigSource::EnvFile(path);
    }
    match assets_dir.map(|dir| dir.join(DEFAULT_CONFIG_FILE)) {
        Some(default_path) if default_path.is_file() => ConfigSource::AssetsFile(default_path),
        _ => ConfigSource::Defaults,
    }
}

pub fn load_session_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_session_config(&raw, path)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_session_config(raw: &str, origin: &Path) -> Result<SessionConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SessionConfig>(&mut deserializer).map_err(|error| {
        ConfigError::Parse {
            path: origin.to_path_buf(),
            field: error.path().to_string(),
            message: error.inner().to_string(),
        }
    })
}

fn require_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be finite and > 0, got {value}"
        )))
    }
}

fn require_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be finite and >= 0, got {value}"
        )))
    }
}

fn require_in_unit_range(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be within [0, 1], got {value}"
        )))
    }
}

fn require_finite_all(field: &str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must be finite")))
    }
}

fn require_zone_identity(
    scope: &str,
    target: &str,
    seen: &mut HashSet<u32>,
    id: u32,
) -> Result<(), ConfigError> {
    if !seen.insert(id) {
        return Err(ConfigError::Invalid(format!("{scope}: duplicate zone id")));
    }
    if target.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{scope}: navigation target must not be empty"
        )));
    }
    Ok(())
}

fn default_circle_zones() -> Vec<CircleZoneConfig> {
    [
        (1, "Top left", 25.0, 25.0, "https://www.example1.com"),
        (2, "Top right", 75.0, 25.0, "https://www.example2.com"),
        (3, "Bottom left", 25.0, 75.0, "https://www.example3.com"),
        (4, "Bottom right", 75.0, 75.0, "https://www.example4.com"),
    ]
    .into_iter()
    .map(|(id, label, x, y, target)| CircleZoneConfig {
        id,
        label: label.to_string(),
        target: target.to_string(),
        center_pct: [x, y],
        radius_px: 40.0,
    })
    .collect()
}

fn default_box_zones() -> Vec<BoxZoneConfig> {
    use std::f32::consts::FRAC_PI_4;
    vec![
        BoxZoneConfig {
            id: 1,
            label: "Example Link 1".to_string(),
            target: "#".to_string(),
            center: [10.0, 0.0, 10.0],
            half_extents: [1.0, 2.0, 2.0],
            rotation_y: FRAC_PI_4,
        },
        BoxZoneConfig {
            id: 2,
            label: "Example Link 2".to_string(),
            target: "#".to_string(),
            center: [-10.0, 0.0, -10.0],
            half_extents: [1.0, 2.0, 2.0],
            rotation_y: -FRAC_PI_4,
        },
    ]
}
