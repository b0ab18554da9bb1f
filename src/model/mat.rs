use serde::{Deserialize, Serialize};

use crate::geometry::Color;

pub const MAT_WIDTH_MIN: f64 = 10.0;
pub const MAT_WIDTH_MAX: f64 = 200.0;
pub const DEFAULT_MAT_WIDTH: f64 = 50.0;
pub const DEFAULT_MAT_COLOR: Color = Color::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatTexture {
    #[default]
    Smooth,
    Textured,
}

/// Passe-partout settings.
///
/// Width, color and texture survive while the mat is disabled so toggling it back on
/// restores what the user had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MatConfigRecord")]
pub struct MatConfig {
    enabled: bool,
    width: f64,
    color: Color,
    texture: MatTexture,
}

#[derive(Deserialize)]
struct MatConfigRecord {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_color")]
    color: Color,
    #[serde(default)]
    texture: MatTexture,
}

fn default_enabled() -> bool {
    true
}

fn default_width() -> f64 {
    DEFAULT_MAT_WIDTH
}

fn default_color() -> Color {
    DEFAULT_MAT_COLOR
}

impl From<MatConfigRecord> for MatConfig {
    fn from(record: MatConfigRecord) -> Self {
        Self::new(record.enabled, record.width, record.color, record.texture)
    }
}

impl MatConfig {
    pub fn new(enabled: bool, width: f64, color: Color, texture: MatTexture) -> Self {
        let mut config = Self {
            enabled,
            width: DEFAULT_MAT_WIDTH,
            color,
            texture,
        };
        config.set_width(width);
        config
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn texture(&self) -> MatTexture {
        self.texture
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = super::clamp_or(width, MAT_WIDTH_MIN, MAT_WIDTH_MAX, DEFAULT_MAT_WIDTH);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_texture(&mut self, texture: MatTexture) {
        self.texture = texture;
    }
}

impl Default for MatConfig {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAT_WIDTH, DEFAULT_MAT_COLOR, MatTexture::Smooth)
    }
}
