use dwell_engine::sim::{TickReport, ZoneId, ZoneSet};
use dwell_engine::{Scene, SessionConfig, ShapeStyle};

use self::gallery::GalleryScene;
use self::lobby::LobbyScene;
use self::sink::TracingNavigationSink;

mod gallery;
mod lobby;
mod sink;
#[cfg(test)]
mod tests;

pub(crate) fn build_scene_pair(session: &SessionConfig) -> (Box<dyn Scene>, Box<dyn Scene>) {
    (
        Box::new(LobbyScene::new(session)),
        Box::new(GalleryScene::new(session)),
    )
}

/// A zone that is overlapped but no longer armed has already fired.
fn zone_style(report: &TickReport, id: ZoneId) -> ShapeStyle {
    if report.armed_zone == Some(id) {
        ShapeStyle::ArmedZone
    } else if report.overlapping == Some(id) {
        ShapeStyle::FiredZone
    } else {
        ShapeStyle::Zone
    }
}

/// Fraction of the dwell still to go, only while a zone is armed.
fn countdown_fraction(report: &TickReport, duration_seconds: f32) -> Option<f32> {
    report.armed_zone?;
    if duration_seconds > 0.0 {
        Some((report.remaining_seconds / duration_seconds).clamp(0.0, 1.0))
    } else {
        Some(0.0)
    }
}

fn dwell_title(
    scene_label: &str,
    report: &TickReport,
    zones: &ZoneSet,
    sink: &TracingNavigationSink,
) -> String {
    let label_of = |id: ZoneId| {
        zones
            .get(id)
            .map(|zone| zone.label.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let status = match (report.armed_zone, report.overlapping) {
        (Some(zone), _) => format!("{} | {}", label_of(zone), report.remaining_display_seconds),
        (None, Some(zone)) => format!("{} | sent", label_of(zone)),
        (None, None) => "idle".to_string(),
    };
    match sink.last_target() {
        Some(target) => format!("{scene_label} | {status} | last: {target}"),
        None => format!("{scene_label} | {status}"),
    }
}
