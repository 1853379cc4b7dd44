use dwell_engine::sim::{DwellState, Vec2, ZoneId};
use dwell_engine::{
    InputAction, InputSnapshot, Scene, SceneCommand, SceneKey, SessionConfig, ShapeStyle,
    ViewShape,
};

use super::gallery::GalleryScene;
use super::lobby::LobbyScene;

const DT: f32 = 1.0 / 60.0;
const WINDOW: (u32, u32) = (1000, 800);

fn idle_input() -> InputSnapshot {
    InputSnapshot::empty().with_window_size(WINDOW)
}

fn held(actions: &[InputAction]) -> InputSnapshot {
    actions
        .iter()
        .fold(idle_input(), |snapshot, action| snapshot.with_action_down(*action, true))
}

fn click_at(cursor_px: Vec2) -> InputSnapshot {
    idle_input()
        .with_left_click_pressed(true)
        .with_cursor_position_px(Some(cursor_px))
}

fn run_ticks(scene: &mut dyn Scene, input: &InputSnapshot, ticks: u32) {
    for _ in 0..ticks {
        assert_eq!(scene.update(DT, input), SceneCommand::None);
    }
}

fn lobby_at(start_pct: [f32; 2]) -> LobbyScene {
    let mut session = SessionConfig::default();
    session.planar.start_pct = start_pct;
    let mut scene = LobbyScene::new(&session);
    scene.load();
    scene
}

fn gallery_at(start: [f32; 3]) -> GalleryScene {
    let mut session = SessionConfig::default();
    session.walker.start = start;
    let mut scene = GalleryScene::new(&session);
    scene.load();
    scene
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1.0e-3
}

#[test]
fn lobby_key_moves_agent_one_stride() {
    let mut scene = lobby_at([50.0, 50.0]);

    run_ticks(&mut scene, &held(&[InputAction::MoveRight]), 1);

    let position = scene.simulation().body().position_pct;
    assert!(approx(position.x, 50.35), "x was {}", position.x);
    assert!(approx(position.y, 50.0));
}

#[test]
fn lobby_agent_stays_inside_window() {
    let mut scene = lobby_at([50.0, 50.0]);

    run_ticks(&mut scene, &held(&[InputAction::MoveLeft, InputAction::MoveForward]), 2_000);

    let position = scene.simulation().body().position_pct;
    assert!(approx(position.x, 0.0));
    assert!(approx(position.y, 0.0));
}

#[test]
fn lobby_click_sets_homing_target_in_percent() {
    let mut scene = lobby_at([50.0, 50.0]);

    run_ticks(&mut scene, &click_at(Vec2::new(750.0, 600.0)), 1);

    let target = scene
        .simulation()
        .movement()
        .homing_target()
        .expect("homing target");
    assert!(approx(target.x, 75.0));
    assert!(approx(target.y, 75.0));
    let position = scene.simulation().body().position_pct;
    assert!(position.x > 50.0 && position.y > 50.0);
}

#[test]
fn lobby_click_while_steering_is_ignored() {
    let mut scene = lobby_at([50.0, 50.0]);
    let input = click_at(Vec2::new(750.0, 600.0)).with_action_down(InputAction::MoveBack, true);

    run_ticks(&mut scene, &input, 1);

    assert!(scene.simulation().movement().homing_target().is_none());
}

#[test]
fn lobby_direction_key_cancels_homing() {
    let mut scene = lobby_at([50.0, 50.0]);
    run_ticks(&mut scene, &click_at(Vec2::new(750.0, 600.0)), 1);
    assert!(scene.simulation().movement().homing_target().is_some());

    run_ticks(&mut scene, &held(&[InputAction::MoveForward]), 1);
    assert!(scene.simulation().movement().homing_target().is_none());

    let after_key = scene.simulation().body().position_pct;
    run_ticks(&mut scene, &idle_input(), 30);
    assert_eq!(scene.simulation().body().position_pct, after_key);
}

#[test]
fn lobby_dwell_fires_navigation_once() {
    let mut scene = lobby_at([25.0, 25.0]);

    run_ticks(&mut scene, &idle_input(), 1);
    assert_eq!(scene.simulation().dwell().armed_zone(), Some(ZoneId(1)));
    assert_eq!(scene.sink().fired(), 0);

    run_ticks(&mut scene, &idle_input(), 240);
    assert_eq!(scene.sink().fired(), 1);
    assert_eq!(scene.sink().last_target(), Some("https://www.example1.com"));
    assert_eq!(
        scene.simulation().dwell().state(),
        DwellState::Fired { zone: ZoneId(1) }
    );

    run_ticks(&mut scene, &idle_input(), 240);
    assert_eq!(scene.sink().fired(), 1);

    let title = scene.debug_title().expect("title");
    assert!(title.contains("last: https://www.example1.com"), "{title}");
    assert_eq!(scene.status().navigations_fired, 1);
}

#[test]
fn lobby_leaving_zone_cancels_countdown() {
    let mut scene = lobby_at([25.0, 25.0]);
    run_ticks(&mut scene, &idle_input(), 90);
    assert!(scene.simulation().dwell().armed_zone().is_some());

    run_ticks(&mut scene, &held(&[InputAction::MoveRight]), 30);
    assert_eq!(scene.simulation().dwell().state(), DwellState::Idle);
    assert!(!scene.simulation().dwell().countdown_task_active());

    run_ticks(&mut scene, &idle_input(), 300);
    assert_eq!(scene.sink().fired(), 0);
}

#[test]
fn lobby_tab_requests_gallery_without_ticking() {
    let mut scene = lobby_at([50.0, 50.0]);
    let input = held(&[InputAction::MoveRight]).with_switch_scene_pressed(true);

    assert_eq!(
        scene.update(DT, &input),
        SceneCommand::SwitchTo(SceneKey::Gallery)
    );
    assert_eq!(scene.simulation().body().position_pct, Vec2::new(50.0, 50.0));
}

#[test]
fn lobby_unload_stops_simulation_and_load_resumes() {
    let mut scene = lobby_at([25.0, 25.0]);
    run_ticks(&mut scene, &idle_input(), 30);
    assert!(scene.simulation().dwell().armed_zone().is_some());

    scene.unload();
    assert!(!scene.simulation().is_running());
    assert_eq!(scene.simulation().dwell().state(), DwellState::Idle);

    run_ticks(&mut scene, &held(&[InputAction::MoveRight]), 10);
    assert_eq!(scene.simulation().body().position_pct, Vec2::new(25.0, 25.0));

    scene.load();
    assert!(scene.simulation().is_running());
}

#[test]
fn lobby_view_marks_armed_zone_and_countdown() {
    let mut scene = lobby_at([25.0, 25.0]);
    run_ticks(&mut scene, &idle_input(), 1);

    let view = scene.view(WINDOW);
    let zone_styles: Vec<ShapeStyle> = view
        .shapes
        .iter()
        .filter_map(|shape| match shape {
            ViewShape::Circle {
                filled: false,
                style,
                ..
            } => Some(*style),
            _ => None,
        })
        .collect();
    assert_eq!(
        zone_styles,
        vec![
            ShapeStyle::ArmedZone,
            ShapeStyle::Zone,
            ShapeStyle::Zone,
            ShapeStyle::Zone
        ]
    );
    assert!(matches!(
        view.shapes.last(),
        Some(ViewShape::Circle {
            filled: true,
            style: ShapeStyle::Agent,
            ..
        })
    ));
    let fraction = view.countdown_fraction.expect("countdown shown");
    assert!(fraction > 0.99);
}

#[test]
fn lobby_view_shows_homing_marker() {
    let mut scene = lobby_at([50.0, 50.0]);
    run_ticks(&mut scene, &click_at(Vec2::new(750.0, 600.0)), 1);

    let view = scene.view(WINDOW);
    let marker = view.shapes.iter().find_map(|shape| match shape {
        ViewShape::Cross { center_px, .. } => Some(*center_px),
        _ => None,
    });
    let marker = marker.expect("homing marker");
    assert!(approx(marker.x, 750.0));
    assert!(approx(marker.y, 600.0));
    assert_eq!(view.countdown_fraction, None);
}

#[test]
fn gallery_walk_into_box_fires_navigation() {
    let mut scene = gallery_at([10.0, 1.6, 14.0]);
    run_ticks(&mut scene, &idle_input(), 1);
    assert_eq!(scene.simulation().dwell().armed_zone(), None);

    run_ticks(&mut scene, &held(&[InputAction::MoveForward]), 60);
    let position = scene.simulation().body().position;
    assert!(approx(position.z, 9.0), "z was {}", position.z);
    assert_eq!(scene.simulation().dwell().armed_zone(), Some(ZoneId(1)));

    run_ticks(&mut scene, &idle_input(), 240);
    assert_eq!(scene.sink().fired(), 1);
    assert_eq!(scene.sink().last_target(), Some("#"));
}

#[test]
fn gallery_tab_requests_lobby() {
    let mut scene = gallery_at([0.0, 1.6, 0.0]);
    let input = idle_input().with_switch_scene_pressed(true);

    assert_eq!(
        scene.update(DT, &input),
        SceneCommand::SwitchTo(SceneKey::Lobby)
    );
}

#[test]
fn gallery_unload_stops_walker() {
    let mut scene = gallery_at([0.0, 1.6, 0.0]);
    scene.unload();

    run_ticks(&mut scene, &held(&[InputAction::MoveForward]), 30);
    assert!(approx(scene.simulation().body().position.z, 0.0));
}

#[test]
fn gallery_view_centers_walker_and_draws_boxes() {
    let scene = gallery_at([0.0, 1.6, 0.0]);

    let view = scene.view((1280, 720));
    let quads = view
        .shapes
        .iter()
        .filter(|shape| matches!(shape, ViewShape::Quad { .. }))
        .count();
    assert_eq!(quads, 2);

    let agent = view.shapes.iter().find_map(|shape| match shape {
        ViewShape::Circle {
            center_px,
            style: ShapeStyle::Agent,
            ..
        } => Some(*center_px),
        _ => None,
    });
    assert_eq!(agent, Some(Vec2::new(640.0, 360.0)));

    let facing = view.shapes.iter().find_map(|shape| match shape {
        ViewShape::Cross { center_px, .. } => Some(*center_px),
        _ => None,
    });
    let facing = facing.expect("facing marker");
    assert!(approx(facing.x, 640.0));
    assert!(facing.y < 360.0);
}

#[test]
fn gallery_title_reports_position() {
    let scene = gallery_at([0.0, 1.6, 0.0]);
    let title = scene.debug_title().expect("title");
    assert!(title.starts_with("Gallery | idle"), "{title}");
    assert!(title.contains("pos (0.0, 1.60, 0.0)"), "{title}");
}

#[test]
fn lobby_status_follows_each_tick_report() {
    let mut scene = lobby_at([50.0, 50.0]);
    run_ticks(&mut scene, &held(&[InputAction::MoveRight]), 1);

    let status = scene.status();
    let body = scene.simulation().body().position_pct;
    assert_eq!(status.position.x, body.x);
    assert_eq!(status.position.y, body.y);
    assert_eq!(status.overlapping_zone, None);
    assert_eq!(status.remaining_display_seconds, 3);
}

#[test]
fn gallery_status_reports_zone_and_countdown() {
    let mut scene = gallery_at([10.0, 1.6, 10.0]);
    run_ticks(&mut scene, &idle_input(), 61);

    let status = scene.status();
    assert!(approx(status.position.x, 10.0));
    assert!(approx(status.position.z, 10.0));
    assert_eq!(status.overlapping_zone, Some(ZoneId(1)));
    assert_eq!(status.armed_zone, Some(ZoneId(1)));
    assert_eq!(status.remaining_display_seconds, 2);

    scene.unload();
    let status = scene.status();
    assert_eq!(status.armed_zone, None);
    assert_eq!(status.overlapping_zone, None);
}
