use serde::{Deserialize, Serialize};

use crate::geometry::Color;

pub const FRAME_WIDTH_MIN: f64 = 10.0;
pub const FRAME_WIDTH_MAX: f64 = 150.0;
pub const DEFAULT_FRAME_WIDTH: f64 = 40.0;
pub const FRAME_DEPTH_MIN: f64 = 0.0;
pub const FRAME_DEPTH_MAX: f64 = 30.0;
pub const DEFAULT_FRAME_DEPTH: f64 = 10.0;
pub const DEFAULT_FRAME_COLOR: Color = Color::BLACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameStyle {
    #[default]
    ModernBlack,
    ModernWhite,
    OakWood,
    DarkWalnut,
    GoldOrnate,
    SilverMetal,
    CustomColor,
}

impl FrameStyle {
    pub const ALL: [FrameStyle; 7] = [
        Self::ModernBlack,
        Self::ModernWhite,
        Self::OakWood,
        Self::DarkWalnut,
        Self::GoldOrnate,
        Self::SilverMetal,
        Self::CustomColor,
    ];

    pub const fn is_custom(self) -> bool {
        matches!(self, Self::CustomColor)
    }
}

/// Frame moulding settings. Numeric fields are clamped to their slider range on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameConfigRecord")]
pub struct FrameConfig {
    style: FrameStyle,
    width: f64,
    color: Color,
    depth: f64,
}

#[derive(Deserialize)]
struct FrameConfigRecord {
    #[serde(default)]
    style: FrameStyle,
    #[serde(default = "default_width")]
    width: f64,
    #[serde(default = "default_color")]
    color: Color,
    #[serde(default = "default_depth")]
    depth: f64,
}

fn default_width() -> f64 {
    DEFAULT_FRAME_WIDTH
}

fn default_color() -> Color {
    DEFAULT_FRAME_COLOR
}

fn default_depth() -> f64 {
    DEFAULT_FRAME_DEPTH
}

impl From<FrameConfigRecord> for FrameConfig {
    fn from(record: FrameConfigRecord) -> Self {
        Self::new(record.style, record.width, record.color, record.depth)
    }
}

impl FrameConfig {
    pub fn new(style: FrameStyle, width: f64, color: Color, depth: f64) -> Self {
        let mut config = Self {
            style,
            width: DEFAULT_FRAME_WIDTH,
            color,
            depth: DEFAULT_FRAME_DEPTH,
        };
        config.set_width(width);
        config.set_depth(depth);
        config
    }

    pub const fn style(&self) -> FrameStyle {
        self.style
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Caller-chosen color. Only rendered when the style is [`FrameStyle::CustomColor`].
    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn depth(&self) -> f64 {
        self.depth
    }

    pub fn set_style(&mut self, style: FrameStyle) {
        self.style = style;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = super::clamp_or(width, FRAME_WIDTH_MIN, FRAME_WIDTH_MAX, DEFAULT_FRAME_WIDTH);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.depth = super::clamp_or(depth, FRAME_DEPTH_MIN, FRAME_DEPTH_MAX, DEFAULT_FRAME_DEPTH);
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new(
            FrameStyle::ModernBlack,
            DEFAULT_FRAME_WIDTH,
            DEFAULT_FRAME_COLOR,
            DEFAULT_FRAME_DEPTH,
        )
    }
}
