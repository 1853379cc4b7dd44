use dwell_engine::{resolve_optional_app_paths, resolve_session_config, AppError, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) lobby: Box<dyn Scene>,
    pub(crate) gallery: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Dwell Navigation Startup ===");

    let paths = resolve_optional_app_paths()?;
    if let Some(paths) = &paths {
        info!(
            root = %paths.root.display(),
            assets_dir = %paths.assets_dir.display(),
            "startup"
        );
    }

    let (session, _source) = resolve_session_config(paths.as_ref())?;
    let (lobby, gallery) = gameplay::build_scene_pair(&session);

    Ok(AppWiring {
        config: session.host_loop.loop_config(),
        lobby,
        gallery,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
