//! Shared geometric and color primitives used by the model, scene and raster modules.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Largest size with the same aspect ratio that fits in `bounds` without upscaling.
    pub fn fit_within(self, bounds: Size) -> Size {
        if self.is_empty() || bounds.is_empty() {
            return Size::new(0.0, 0.0);
        }
        let scale = (bounds.width / self.width)
            .min(bounds.height / self.height)
            .min(1.0);
        Size::new(self.width * scale, self.height * scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn inset(&self, insets: Insets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.left - insets.right).max(0.0),
            (self.height - insets.top - insets.bottom).max(0.0),
        )
    }

    pub fn outset(&self, insets: Insets) -> Rect {
        Rect::new(
            self.x - insets.left,
            self.y - insets.top,
            self.width + insets.left + insets.right,
            self.height + insets.top + insets.bottom,
        )
    }
}

/// Padding or margin on the four sides of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub const ZERO: Self = Self::uniform(0.0);

    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Integer rectangle in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Scale, translate and rotate, applied about the pivot of the layer that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub scale: f64,
    pub translate: Point,
    pub rotate_degrees: i32,
    pub pivot: Point,
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Point::ZERO,
        rotate_degrees: 0,
        pivot: Point::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0
            && self.translate == Point::ZERO
            && self.rotate_degrees.rem_euclid(360) == 0
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotate_degrees = degrees;
        self
    }

    /// Maps a point through scale about the pivot followed by the translation.
    /// Rotation is left to the consumer since it only ever applies to the art box.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.pivot.x + (point.x - self.pivot.x) * self.scale + self.translate.x,
            self.pivot.y + (point.y - self.pivot.y) * self.scale + self.translate.y,
        )
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        let origin = self.apply(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color literal: {literal}")]
pub struct ColorParseError {
    pub literal: String,
}

/// Opaque sRGB color. Serialized as an upper-case `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(value: u32) -> Self {
        Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_hex_string(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let error = || ColorParseError {
            literal: literal.to_string(),
        };
        let digits = literal.trim().strip_prefix('#').ok_or_else(error)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(error()),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| error())?;
        Ok(Self::from_hex(value))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}

/// Straight-alpha color used for shadows and overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub color: Color,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(color: Color, alpha: f64) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn black(alpha: f64) -> Self {
        Self::new(Color::BLACK, alpha)
    }
}
