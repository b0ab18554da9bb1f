use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::Size;
use crate::scene::DEFAULT_MAX_ART_FRACTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

pub(crate) const APP_DIR: &str = "artframe";
const APP_CONFIG_FILE: &str = "config.json";
const EXPORT_SUBDIR: &str = "Pictures";
const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Application-level settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub max_art_fraction: Option<f64>,
    #[serde(default)]
    pub persist_themes: Option<bool>,
    /// Directory holding the wall texture images named by the catalog.
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn viewport(&self) -> Size {
        let positive = |value: Option<f64>, fallback: f64| {
            value
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(fallback)
        };
        Size::new(
            positive(self.viewport_width, DEFAULT_VIEWPORT_WIDTH),
            positive(self.viewport_height, DEFAULT_VIEWPORT_HEIGHT),
        )
    }

    pub fn max_art_fraction(&self) -> f64 {
        self.max_art_fraction
            .filter(|v| v.is_finite() && *v > 0.0 && *v <= 1.0)
            .unwrap_or(DEFAULT_MAX_ART_FRACTION)
    }

    pub fn persist_themes(&self) -> bool {
        self.persist_themes.unwrap_or(true)
    }

    pub fn asset_dir(&self) -> Option<&Path> {
        self.asset_dir.as_deref()
    }

    /// Configured export directory, else `$HOME/Pictures`, else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        if let Some(dir) = self.export_dir.clone() {
            return dir;
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(EXPORT_SUBDIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
