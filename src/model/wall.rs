use serde::{Deserialize, Serialize};

use crate::art::ImageHandle;
use crate::geometry::{Color, Point};

pub const PLACEMENT_SCALE_MIN: f64 = 0.1;
pub const PLACEMENT_SCALE_MAX: f64 = 2.0;
pub const DEFAULT_PLACEMENT_SCALE: f64 = 1.0;
pub const PLACEMENT_OFFSET_LIMIT: f64 = 500.0;
pub const DEFAULT_WALL_COLOR: Color = Color::from_hex(0xE2E8F0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WallStyle {
    SolidColor,
    #[default]
    Concrete,
    BrickWhite,
    #[serde(alias = "DARK_MODE")]
    DarkStudio,
    LivingRoomPhoto,
    CustomImage,
}

impl WallStyle {
    pub const ALL: [WallStyle; 6] = [
        Self::SolidColor,
        Self::Concrete,
        Self::BrickWhite,
        Self::DarkStudio,
        Self::LivingRoomPhoto,
        Self::CustomImage,
    ];

    pub const fn needs_custom_asset(self) -> bool {
        matches!(self, Self::CustomImage)
    }
}

/// Where the framed composite sits on the wall, in viewport pixels from center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlacementOffset {
    pub x: f64,
    pub y: f64,
}

impl PlacementOffset {
    pub fn new(x: f64, y: f64) -> Self {
        let clamp = |value: f64| {
            super::clamp_or(value, -PLACEMENT_OFFSET_LIMIT, PLACEMENT_OFFSET_LIMIT, 0.0)
        };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    pub const fn as_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WallConfigRecord")]
pub struct WallConfig {
    style: WallStyle,
    color: Color,
    #[serde(skip)]
    custom_image: Option<ImageHandle>,
    scale: f64,
    position: PlacementOffset,
    fallback_style: WallStyle,
}

/// Older snapshots carry only `style` and `color`; placement defaults are resolved here
/// once instead of inside the resolver.
#[derive(Deserialize)]
struct WallConfigRecord {
    #[serde(default)]
    style: WallStyle,
    #[serde(default = "default_color")]
    color: Color,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    position: Option<PlacementOffset>,
    #[serde(default)]
    fallback_style: Option<WallStyle>,
}

fn default_color() -> Color {
    DEFAULT_WALL_COLOR
}

impl From<WallConfigRecord> for WallConfig {
    fn from(record: WallConfigRecord) -> Self {
        let mut config = Self::new(record.style, record.color);
        config.set_placement_scale(record.scale.unwrap_or(DEFAULT_PLACEMENT_SCALE));
        let position = record.position.unwrap_or_default();
        config.set_placement_offset(position.x, position.y);
        if let Some(fallback) = record
            .fallback_style
            .filter(|style| !style.needs_custom_asset())
        {
            config.fallback_style = fallback;
        }
        config
    }
}

impl WallConfig {
    pub fn new(style: WallStyle, color: Color) -> Self {
        let fallback_style = if style.needs_custom_asset() {
            WallStyle::default()
        } else {
            style
        };
        Self {
            style,
            color,
            custom_image: None,
            scale: DEFAULT_PLACEMENT_SCALE,
            position: PlacementOffset::default(),
            fallback_style,
        }
    }

    pub const fn style(&self) -> WallStyle {
        self.style
    }

    /// Paint color, rendered only for [`WallStyle::SolidColor`].
    pub const fn color(&self) -> Color {
        self.color
    }

    pub fn custom_image(&self) -> Option<&ImageHandle> {
        self.custom_image.as_ref()
    }

    pub const fn placement_scale(&self) -> f64 {
        self.scale
    }

    pub const fn placement_offset(&self) -> PlacementOffset {
        self.position
    }

    /// Most recent style that renders without caller-supplied data.
    pub const fn fallback_style(&self) -> WallStyle {
        self.fallback_style
    }

    pub fn set_style(&mut self, style: WallStyle) {
        if !style.needs_custom_asset() {
            self.fallback_style = style;
        }
        self.style = style;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_custom_image(&mut self, image: Option<ImageHandle>) {
        self.custom_image = image;
    }

    pub fn set_placement_scale(&mut self, scale: f64) {
        self.scale = super::clamp_or(
            scale,
            PLACEMENT_SCALE_MIN,
            PLACEMENT_SCALE_MAX,
            DEFAULT_PLACEMENT_SCALE,
        );
    }

    pub fn set_placement_offset(&mut self, x: f64, y: f64) {
        self.position = PlacementOffset::new(x, y);
    }
}

impl Default for WallConfig {
    fn default() -> Self {
        Self::new(WallStyle::Concrete, DEFAULT_WALL_COLOR)
    }
}
