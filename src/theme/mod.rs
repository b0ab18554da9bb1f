//! Named configuration snapshots: built-in presets plus user-saved themes with one optional
//! default, persisted through a [`KeyValueStore`].

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog;
use crate::geometry::Color;
use crate::model::{
    Configuration, FrameConfig, FrameStyle, MatConfig, MatTexture, WallConfig, WallStyle,
};
use crate::storage::{KeyValueStore, StorageError};

pub const CUSTOM_THEMES_KEY: &str = "artframe.custom_themes";
pub const DEFAULT_THEME_KEY: &str = "artframe.default_theme_id";
const CUSTOM_ID_PREFIX: &str = "custom-";
const DEFAULT_CUSTOM_LABEL: &str = "Custom Theme";

pub type ThemeResult<T> = std::result::Result<T, ThemeError>;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to encode or decode saved themes")]
    Serde(#[from] serde_json::Error),
    #[error("unknown theme preset: {id}")]
    UnknownPreset { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePreset {
    pub id: String,
    pub label: String,
    pub description: String,
    pub preview_color: Color,
    pub config: Configuration,
}

impl ThemePreset {
    fn new(id: String, label: String, config: Configuration) -> Self {
        Self {
            description: describe(&config),
            preview_color: preview_color(&config.frame),
            id,
            label,
            config,
        }
    }
}

/// Swatch shown for a preset: the custom frame color when one is in use, otherwise the
/// catalog swatch of the frame style.
pub fn preview_color(frame: &FrameConfig) -> Color {
    if frame.style().is_custom() {
        frame.color()
    } else {
        catalog::frame_swatch(frame.style())
    }
}

fn describe(config: &Configuration) -> String {
    let frame_label = catalog::frame_entry(config.frame.style()).label;
    let wall_label = catalog::wall_entry(config.wall.style()).label;
    if config.mat.enabled() {
        let texture = match config.mat.texture() {
            MatTexture::Smooth => "",
            MatTexture::Textured => " textured",
        };
        format!(
            "{frame_label} frame, {}px{texture} mat, {wall_label} wall",
            config.mat.width()
        )
    } else {
        format!("{frame_label} frame, no mat, {wall_label} wall")
    }
}

/// Presets shipped with the application, in display order.
pub fn builtin_presets() -> Vec<ThemePreset> {
    let preset = |id: &str, label: &str, frame, mat, wall| {
        ThemePreset::new(
            id.to_string(),
            label.to_string(),
            Configuration::new(frame, mat, wall),
        )
    };
    vec![
        preset(
            "gallery-classic",
            "Gallery Classic",
            FrameConfig::new(FrameStyle::ModernBlack, 40.0, Color::BLACK, 10.0),
            MatConfig::new(true, 50.0, Color::WHITE, MatTexture::Smooth),
            WallConfig::new(WallStyle::Concrete, crate::model::DEFAULT_WALL_COLOR),
        ),
        preset(
            "museum-gold",
            "Museum Gold",
            FrameConfig::new(FrameStyle::GoldOrnate, 60.0, Color::BLACK, 20.0),
            MatConfig::new(true, 80.0, Color::from_hex(0xF5F5DC), MatTexture::Textured),
            WallConfig::new(WallStyle::DarkStudio, crate::model::DEFAULT_WALL_COLOR),
        ),
        preset(
            "scandi-oak",
            "Scandi Oak",
            FrameConfig::new(FrameStyle::OakWood, 30.0, Color::BLACK, 6.0),
            MatConfig::new(false, 50.0, Color::WHITE, MatTexture::Smooth),
            WallConfig::new(WallStyle::BrickWhite, crate::model::DEFAULT_WALL_COLOR),
        ),
        preset(
            "modern-white",
            "Modern White",
            FrameConfig::new(FrameStyle::ModernWhite, 24.0, Color::BLACK, 4.0),
            MatConfig::new(true, 40.0, Color::from_hex(0x808080), MatTexture::Smooth),
            WallConfig::new(WallStyle::SolidColor, Color::from_hex(0x2D3748)),
        ),
    ]
}

/// Fresh copies of a preset's configuration, detached from the stored preset.
pub fn apply(preset: &ThemePreset) -> (FrameConfig, MatConfig, WallConfig) {
    preset.config.clone().into_parts()
}

/// Persisted theme state as read from storage at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeSnapshot {
    pub custom_presets: Vec<ThemePreset>,
    pub default_id: Option<String>,
}

impl ThemeSnapshot {
    /// Reads both keys independently. A key that cannot be read or decoded is logged and
    /// treated as absent, so a corrupt theme list does not take the default pointer with it.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let custom_presets = load_custom_presets(store).unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to load saved themes; starting without them");
            Vec::new()
        });
        let default_id = load_default_id(store).unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to load default theme id");
            None
        });
        Self {
            custom_presets,
            default_id,
        }
    }
}

fn load_custom_presets<S: KeyValueStore>(store: &S) -> ThemeResult<Vec<ThemePreset>> {
    match store.get(CUSTOM_THEMES_KEY)? {
        Some(serialized) => Ok(serde_json::from_str(&serialized)?),
        None => Ok(Vec::new()),
    }
}

fn load_default_id<S: KeyValueStore>(store: &S) -> ThemeResult<Option<String>> {
    Ok(store
        .get(DEFAULT_THEME_KEY)?
        .filter(|id| !id.trim().is_empty()))
}

/// Starting configuration: the default theme when one is set and still exists, otherwise
/// the hardcoded defaults.
pub fn initial_configuration(snapshot: &ThemeSnapshot) -> Configuration {
    let Some(default_id) = snapshot.default_id.as_deref() else {
        return Configuration::default();
    };
    let preset = builtin_presets()
        .into_iter()
        .chain(snapshot.custom_presets.iter().cloned())
        .find(|preset| preset.id == default_id);
    match preset {
        Some(preset) => {
            tracing::info!(id = default_id, "starting from default theme");
            preset.config
        }
        None => {
            tracing::warn!(id = default_id, "default theme no longer exists; using defaults");
            Configuration::default()
        }
    }
}

#[derive(Debug)]
pub struct ThemeLibrary<S: KeyValueStore> {
    store: S,
    builtins: Vec<ThemePreset>,
    customs: Vec<ThemePreset>,
    default_id: Option<String>,
}

impl<S: KeyValueStore> ThemeLibrary<S> {
    pub fn load(store: S) -> Self {
        let snapshot = ThemeSnapshot::load(&store);
        Self::with_snapshot(store, snapshot)
    }

    pub fn with_snapshot(store: S, snapshot: ThemeSnapshot) -> Self {
        Self {
            store,
            builtins: builtin_presets(),
            customs: snapshot.custom_presets,
            default_id: snapshot.default_id,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        ThemeSnapshot {
            custom_presets: self.customs.clone(),
            default_id: self.default_id.clone(),
        }
    }

    /// Built-ins in catalog order, then saved themes newest first.
    pub fn list(&self) -> Vec<&ThemePreset> {
        self.builtins.iter().chain(self.customs.iter()).collect()
    }

    pub fn custom_presets(&self) -> &[ThemePreset] {
        &self.customs
    }

    pub fn find(&self, id: &str) -> Option<&ThemePreset> {
        self.list().into_iter().find(|preset| preset.id == id)
    }

    pub fn is_builtin(&self, id: &str) -> bool {
        self.builtins.iter().any(|preset| preset.id == id)
    }

    pub fn default_id(&self) -> Option<&str> {
        self.default_id.as_deref()
    }

    pub fn initial_configuration(&self) -> Configuration {
        initial_configuration(&self.snapshot())
    }

    pub fn save(
        &mut self,
        name: &str,
        frame: &FrameConfig,
        mat: &MatConfig,
        wall: &WallConfig,
    ) -> ThemePreset {
        let label = match name.trim() {
            "" => DEFAULT_CUSTOM_LABEL.to_string(),
            trimmed => trimmed.to_string(),
        };
        let config = Configuration::new(frame.clone(), mat.clone(), wall.clone());
        let preset = ThemePreset::new(self.next_custom_id(), label, config);
        self.customs.insert(0, preset.clone());
        tracing::info!(id = %preset.id, label = %preset.label, "saved custom theme");
        self.persist_customs();
        preset
    }

    /// Removes a saved theme. Built-in and unknown ids are left alone.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.customs.len();
        self.customs.retain(|preset| preset.id != id);
        if self.customs.len() == before {
            tracing::debug!(id, "delete ignored; not a saved theme");
            return false;
        }
        self.persist_customs();
        if self.default_id.as_deref() == Some(id) {
            self.default_id = None;
            self.persist_default();
        }
        true
    }

    /// Makes `id` the default, or clears the default when `id` already holds it.
    pub fn toggle_default(&mut self, id: &str) -> Option<&str> {
        if self.default_id.as_deref() == Some(id) {
            self.default_id = None;
        } else {
            self.default_id = Some(id.to_string());
        }
        self.persist_default();
        self.default_id.as_deref()
    }

    pub fn apply_id(&self, id: &str) -> ThemeResult<(FrameConfig, MatConfig, WallConfig)> {
        self.find(id)
            .map(apply)
            .ok_or_else(|| ThemeError::UnknownPreset { id: id.to_string() })
    }

    fn next_custom_id(&self) -> String {
        let mut nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        loop {
            let id = format!("{CUSTOM_ID_PREFIX}{nanos}");
            if self.find(&id).is_none() {
                return id;
            }
            nanos += 1;
        }
    }

    fn persist_customs(&mut self) {
        if let Err(err) = self.write_customs() {
            tracing::warn!(%err, "failed to persist saved themes; keeping them for this session");
        }
    }

    fn write_customs(&mut self) -> ThemeResult<()> {
        let serialized = serde_json::to_string(&self.customs)?;
        self.store.set(CUSTOM_THEMES_KEY, &serialized)?;
        Ok(())
    }

    fn persist_default(&mut self) {
        let result = match self.default_id.as_deref() {
            Some(id) => self.store.set(DEFAULT_THEME_KEY, id),
            None => self.store.remove(DEFAULT_THEME_KEY),
        };
        if let Err(err) = result {
            tracing::warn!(%err, "failed to persist default theme; keeping it for this session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn library() -> ThemeLibrary<MemoryStore> {
        ThemeLibrary::load(MemoryStore::new())
    }

    #[test]
    fn list_puts_builtins_first_and_newest_custom_next() {
        let mut library = library();
        let first = library.save(
            "First",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );
        let second = library.save(
            "Second",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );

        let ids: Vec<&str> = library.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            &ids[..4],
            &["gallery-classic", "museum-gold", "scandi-oak", "modern-white"]
        );
        assert_eq!(&ids[4..], &[second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn save_copies_configuration_instead_of_aliasing_it() {
        let mut library = library();
        let mut frame = FrameConfig::default();
        let mut mat = MatConfig::default();
        let mut wall = WallConfig::default();
        let saved = library.save("Snapshot", &frame, &mat, &wall);

        frame.set_width(120.0);
        mat.set_enabled(false);
        wall.set_style(WallStyle::DarkStudio);

        let stored = library.find(&saved.id).unwrap();
        assert_eq!(stored.config, Configuration::default());
        assert_eq!(stored, &saved);
    }

    #[test]
    fn preview_color_follows_custom_color_or_style_swatch() {
        let mut library = library();
        let mut frame = FrameConfig::default();
        frame.set_color(Color::from_hex(0xFF00AA));
        let saved = library.save("Black", &frame, &MatConfig::default(), &WallConfig::default());
        assert_eq!(saved.preview_color, Color::from_hex(0x1A1A1A));

        frame.set_style(FrameStyle::CustomColor);
        let saved = library.save("Pink", &frame, &MatConfig::default(), &WallConfig::default());
        assert_eq!(saved.preview_color, Color::from_hex(0xFF00AA));
    }

    #[test]
    fn toggle_default_twice_clears_it() {
        let mut library = library();
        assert_eq!(library.toggle_default("museum-gold"), Some("museum-gold"));
        assert_eq!(library.toggle_default("museum-gold"), None);
        assert_eq!(library.default_id(), None);

        library.toggle_default("museum-gold");
        assert_eq!(library.toggle_default("scandi-oak"), Some("scandi-oak"));
        assert_eq!(
            library.store().get(DEFAULT_THEME_KEY).unwrap().as_deref(),
            Some("scandi-oak")
        );
    }

    #[test]
    fn deleting_default_clears_pointer_but_other_deletes_keep_it() {
        let mut library = library();
        let keep = library.save(
            "Keep",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );
        let drop = library.save(
            "Drop",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );

        library.toggle_default(&keep.id);
        assert!(library.delete(&drop.id));
        assert_eq!(library.default_id(), Some(keep.id.as_str()));

        assert!(library.delete(&keep.id));
        assert_eq!(library.default_id(), None);
        assert_eq!(library.store().get(DEFAULT_THEME_KEY).unwrap(), None);
    }

    #[test]
    fn builtins_cannot_be_deleted() {
        let mut library = library();
        assert!(!library.delete("gallery-classic"));
        assert!(library.find("gallery-classic").is_some());
    }

    #[test]
    fn saved_themes_and_default_survive_reload() {
        let mut library = library();
        let mut frame = FrameConfig::default();
        frame.set_style(FrameStyle::DarkWalnut);
        let saved = library.save("Walnut", &frame, &MatConfig::default(), &WallConfig::default());
        library.toggle_default(&saved.id);

        let store = library.store().clone();
        let reloaded = ThemeLibrary::load(store);
        assert_eq!(reloaded.custom_presets(), &[saved.clone()]);
        assert_eq!(reloaded.default_id(), Some(saved.id.as_str()));
        assert_eq!(reloaded.initial_configuration().frame.style(), FrameStyle::DarkWalnut);
    }

    #[test]
    fn storage_failures_do_not_block_session_changes() {
        let mut library = ThemeLibrary::load(MemoryStore::failing());
        let saved = library.save(
            "Offline",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );
        assert_eq!(library.custom_presets().len(), 1);
        assert_eq!(library.toggle_default(&saved.id), Some(saved.id.as_str()));
        assert!(library.delete(&saved.id));
        assert_eq!(library.default_id(), None);
    }

    #[test]
    fn quota_exceeded_keeps_theme_in_memory() {
        let mut library = ThemeLibrary::load(MemoryStore::with_quota(16));
        library.save(
            "Too Big",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );
        assert_eq!(library.custom_presets().len(), 1);
        assert_eq!(library.store().get(CUSTOM_THEMES_KEY).unwrap(), None);
    }

    #[test]
    fn apply_returns_detached_copies() {
        let library = library();
        let (mut frame, mat, wall) = library.apply_id("museum-gold").unwrap();
        assert_eq!(frame.style(), FrameStyle::GoldOrnate);
        assert_eq!(mat.texture(), MatTexture::Textured);
        assert_eq!(wall.style(), WallStyle::DarkStudio);

        frame.set_width(10.0);
        assert_eq!(library.find("museum-gold").unwrap().config.frame.width(), 60.0);
        assert!(matches!(
            library.apply_id("nope"),
            Err(ThemeError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn initial_configuration_falls_back_when_default_is_gone() {
        let snapshot = ThemeSnapshot {
            custom_presets: Vec::new(),
            default_id: Some("custom-123".to_string()),
        };
        assert_eq!(initial_configuration(&snapshot), Configuration::default());

        let snapshot = ThemeSnapshot {
            custom_presets: Vec::new(),
            default_id: Some("scandi-oak".to_string()),
        };
        assert!(!initial_configuration(&snapshot).mat.enabled());
    }

    #[test]
    fn corrupt_saved_themes_keep_default_pointer() {
        let mut store = MemoryStore::new();
        store.set(CUSTOM_THEMES_KEY, "{ not json").unwrap();
        store.set(DEFAULT_THEME_KEY, "museum-gold").unwrap();

        let snapshot = ThemeSnapshot::load(&store);
        assert!(snapshot.custom_presets.is_empty());
        assert_eq!(snapshot.default_id.as_deref(), Some("museum-gold"));
        assert_eq!(
            initial_configuration(&snapshot).frame.style(),
            FrameStyle::GoldOrnate
        );

        let library = ThemeLibrary::load(store);
        assert!(library.custom_presets().is_empty());
        assert_eq!(library.default_id(), Some("museum-gold"));
    }

    #[test]
    fn unavailable_storage_loads_empty_snapshot() {
        assert_eq!(
            ThemeSnapshot::load(&MemoryStore::failing()),
            ThemeSnapshot::default()
        );
    }

    #[test]
    fn empty_name_gets_placeholder_label_and_description() {
        let mut library = library();
        let saved = library.save(
            "   ",
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
        );
        assert_eq!(saved.label, "Custom Theme");
        assert_eq!(saved.description, "Modern Black frame, 50px mat, Concrete wall");
        assert!(saved.id.starts_with("custom-"));
    }
}
