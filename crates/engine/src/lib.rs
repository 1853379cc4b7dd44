use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

pub mod app;
pub mod config;
pub mod sim;

pub use app::{
    run_app, run_app_with_presentation, AppError, InputAction, InputSnapshot, LoopConfig,
    PresentationHandle, PresentationSnapshot, Scene, SceneCommand, SceneKey, SceneStatus,
    SceneView, ShapeStyle, ViewShape,
};
pub use config::{load_session_config, resolve_session_config, ConfigError, ConfigSource, SessionConfig};

pub const ROOT_ENV_VAR: &str = "DWELLNAV_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "DWELLNAV_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\dwellnav\"\n\
Bash/zsh: export {env_var}=\"/path/to/dwellnav\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    Ok(AppPaths { root, assets_dir })
}

/// Like [`resolve_app_paths`], but a binary launched outside any checkout runs
/// detached with built-in defaults instead of failing.
pub fn resolve_optional_app_paths() -> Result<Option<AppPaths>, StartupError> {
    detach_when_root_missing(resolve_app_paths())
}

fn detach_when_root_missing(
    resolved: Result<AppPaths, StartupError>,
) -> Result<Option<AppPaths>, StartupError> {
    match resolved {
        Ok(paths) => Ok(Some(paths)),
        Err(StartupError::RootNotFound { start_dir, env_var }) => {
            warn!(
                start_dir = %start_dir.display(),
                env_var,
                "project root not found; running without assets"
            );
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
