pub mod art;
pub mod catalog;
pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod notification;
pub mod raster;
pub mod scene;
pub mod state;
pub mod storage;
pub mod studio;
pub mod theme;

pub use error::{AppError, AppResult};
pub use studio::Studio;

use raster::CpuRasterizer;
use storage::ThemeStore;

/// Entrypoint used by front ends: logging, settings and the theme store wired into a fresh
/// studio session. Wall textures are read from the configured `asset_dir`; without one,
/// textured walls render in their base color.
pub fn launch() -> Studio<ThemeStore, CpuRasterizer> {
    logging::init();
    let config = config::load_app_config();
    let store = ThemeStore::open(config.persist_themes());

    let mut rasterizer = CpuRasterizer::new();
    let textures = config
        .asset_dir()
        .map_or(0, |dir| rasterizer.load_textures(dir));
    tracing::info!(
        persistent = store.is_persistent(),
        textures,
        "starting artframe studio"
    );
    Studio::with_app_config(store, rasterizer, &config)
}
