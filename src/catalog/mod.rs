//! Static style tables: frame mouldings, wall treatments and mat swatches.

use thiserror::Error;

use crate::art::ImageHandle;
use crate::geometry::Color;
use crate::model::{FrameStyle, WallStyle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub offset: f64,
}

const fn stop(hex: u32, offset: f64) -> GradientStop {
    GradientStop {
        color: Color::from_hex(hex),
        offset,
    }
}

/// Linear gradient in CSS terms: 0deg points up, 90deg points right.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub angle_degrees: f64,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    fn from_stops(angle_degrees: f64, stops: &[GradientStop]) -> Self {
        Self {
            angle_degrees,
            stops: stops.to_vec(),
        }
    }

    /// Color at `t` in [0, 1] along the gradient line.
    pub fn sample(&self, t: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::BLACK;
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = (b.offset - a.offset).max(f64::EPSILON);
                let k = ((t - a.offset) / span).clamp(0.0, 1.0);
                let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * k).round() as u8;
                return Color::new(
                    mix(a.color.r, b.color.r),
                    mix(a.color.g, b.color.g),
                    mix(a.color.b, b.color.b),
                );
            }
        }
        self.stops.last().map_or(first.color, |last| last.color)
    }
}

/// How a texture image covers its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureMode {
    Tile,
    Cover,
}

/// Visual recipe for filling a box.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Color),
    Gradient(LinearGradient),
    /// Named texture asset drawn over a base color.
    Texture {
        asset: &'static str,
        base: Color,
        mode: TextureMode,
    },
    Image(ImageHandle),
    /// Flat color with a fixed low-opacity noise overlay.
    Noise { base: Color, opacity: f64 },
}

impl Fill {
    /// Single representative color, used where a fill has to collapse to one value.
    pub fn base_color(&self) -> Color {
        match self {
            Self::Solid(color) => *color,
            Self::Gradient(gradient) => gradient.sample(0.0),
            Self::Texture { base, .. } | Self::Noise { base, .. } => *base,
            Self::Image(_) => WALL_NEUTRAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("style {style:?} requires a caller-supplied asset that is missing")]
    MissingCustomAsset { style: WallStyle },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyleEntry {
    pub style: FrameStyle,
    pub label: &'static str,
    pub swatch: Color,
    gradient: Option<(f64, &'static [GradientStop])>,
}

impl FrameStyleEntry {
    pub fn gradient(&self) -> Option<LinearGradient> {
        self.gradient
            .map(|(angle, stops)| LinearGradient::from_stops(angle, stops))
    }
}

const OAK_STOPS: &[GradientStop] = &[
    stop(0xD4B08C, 0.0),
    stop(0xC19A6B, 0.2),
    stop(0xD4B08C, 0.4),
    stop(0xC19A6B, 1.0),
];
const WALNUT_STOPS: &[GradientStop] = &[
    stop(0x5D4037, 0.0),
    stop(0x4E342E, 0.5),
    stop(0x5D4037, 1.0),
];
const GOLD_STOPS: &[GradientStop] = &[
    stop(0xC5A059, 0.0),
    stop(0xE6C67C, 0.25),
    stop(0x9D7E3E, 0.5),
    stop(0xC5A059, 0.75),
    stop(0xF0D593, 1.0),
];
const SILVER_STOPS: &[GradientStop] = &[
    stop(0xE2E2E2, 0.0),
    stop(0x999999, 0.5),
    stop(0xE2E2E2, 1.0),
];
const DARK_STUDIO_STOPS: &[GradientStop] = &[stop(0x1A202C, 0.0), stop(0x2D3748, 1.0)];

pub const FRAME_STYLES: [FrameStyleEntry; 7] = [
    FrameStyleEntry {
        style: FrameStyle::ModernBlack,
        label: "Modern Black",
        swatch: Color::from_hex(0x1A1A1A),
        gradient: None,
    },
    FrameStyleEntry {
        style: FrameStyle::ModernWhite,
        label: "Modern White",
        swatch: Color::from_hex(0xF8FAFC),
        gradient: None,
    },
    FrameStyleEntry {
        style: FrameStyle::OakWood,
        label: "Oak Wood",
        swatch: Color::from_hex(0xD4B08C),
        gradient: Some((90.0, OAK_STOPS)),
    },
    FrameStyleEntry {
        style: FrameStyle::DarkWalnut,
        label: "Dark Walnut",
        swatch: Color::from_hex(0x5D4037),
        gradient: Some((90.0, WALNUT_STOPS)),
    },
    FrameStyleEntry {
        style: FrameStyle::GoldOrnate,
        label: "Antique Gold",
        swatch: Color::from_hex(0xC5A059),
        gradient: Some((45.0, GOLD_STOPS)),
    },
    FrameStyleEntry {
        style: FrameStyle::SilverMetal,
        label: "Brushed Silver",
        swatch: Color::from_hex(0xC0C0C0),
        gradient: Some((135.0, SILVER_STOPS)),
    },
    FrameStyleEntry {
        style: FrameStyle::CustomColor,
        label: "Custom Color",
        swatch: Color::from_hex(0x3B82F6),
        gradient: None,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallStyleEntry {
    pub style: WallStyle,
    pub label: &'static str,
}

pub const WALL_STYLES: [WallStyleEntry; 6] = [
    WallStyleEntry {
        style: WallStyle::SolidColor,
        label: "Solid Color",
    },
    WallStyleEntry {
        style: WallStyle::Concrete,
        label: "Concrete",
    },
    WallStyleEntry {
        style: WallStyle::BrickWhite,
        label: "White Brick",
    },
    WallStyleEntry {
        style: WallStyle::DarkStudio,
        label: "Dark Studio",
    },
    WallStyleEntry {
        style: WallStyle::LivingRoomPhoto,
        label: "Living Room",
    },
    WallStyleEntry {
        style: WallStyle::CustomImage,
        label: "Custom Image",
    },
];

/// Color behind tiled wall textures and the neutral used when a wall cannot resolve.
pub const WALL_NEUTRAL: Color = Color::from_hex(0xE2E8F0);

pub const CONCRETE_TEXTURE: &str = "concrete-wall.png";
pub const BRICK_WHITE_TEXTURE: &str = "white-brick-wall.png";
pub const LIVING_ROOM_PHOTO: &str = "living-room.jpg";

/// Every image asset a wall style can reference.
pub const TEXTURE_ASSETS: [&str; 3] = [CONCRETE_TEXTURE, BRICK_WHITE_TEXTURE, LIVING_ROOM_PHOTO];

/// Opacity of the procedural noise laid over textured mats.
pub const MAT_NOISE_OPACITY: f64 = 0.05;

pub const MAT_SWATCHES: [(&str, Color); 6] = [
    ("White", Color::from_hex(0xFFFFFF)),
    ("Beige", Color::from_hex(0xF5F5DC)),
    ("Black", Color::from_hex(0x1A1A1A)),
    ("Grey", Color::from_hex(0x808080)),
    ("Navy", Color::from_hex(0x2A3B55)),
    ("Deep Red", Color::from_hex(0x5C1A1A)),
];

pub fn frame_entry(style: FrameStyle) -> &'static FrameStyleEntry {
    // FRAME_STYLES is declared in FrameStyle::ALL order.
    let index = FrameStyle::ALL
        .iter()
        .position(|candidate| *candidate == style)
        .unwrap_or(0);
    &FRAME_STYLES[index]
}

pub fn wall_entry(style: WallStyle) -> &'static WallStyleEntry {
    let index = WallStyle::ALL
        .iter()
        .position(|candidate| *candidate == style)
        .unwrap_or(0);
    &WALL_STYLES[index]
}

pub fn frame_swatch(style: FrameStyle) -> Color {
    frame_entry(style).swatch
}

pub fn resolve_frame_fill(style: FrameStyle, custom_color: Color) -> Fill {
    if style.is_custom() {
        return Fill::Solid(custom_color);
    }
    let entry = frame_entry(style);
    entry
        .gradient()
        .map_or(Fill::Solid(entry.swatch), Fill::Gradient)
}

pub fn resolve_wall_fill(
    style: WallStyle,
    solid_color: Color,
    custom_image: Option<&ImageHandle>,
) -> CatalogResult<Fill> {
    let fill = match style {
        WallStyle::SolidColor => Fill::Solid(solid_color),
        WallStyle::Concrete => Fill::Texture {
            asset: CONCRETE_TEXTURE,
            base: WALL_NEUTRAL,
            mode: TextureMode::Tile,
        },
        WallStyle::BrickWhite => Fill::Texture {
            asset: BRICK_WHITE_TEXTURE,
            base: WALL_NEUTRAL,
            mode: TextureMode::Tile,
        },
        WallStyle::DarkStudio => Fill::Gradient(LinearGradient::from_stops(180.0, DARK_STUDIO_STOPS)),
        WallStyle::LivingRoomPhoto => Fill::Texture {
            asset: LIVING_ROOM_PHOTO,
            base: Color::from_hex(0xD9D2C5),
            mode: TextureMode::Cover,
        },
        WallStyle::CustomImage => {
            let image = custom_image.ok_or(CatalogError::MissingCustomAsset { style })?;
            Fill::Image(image.clone())
        }
    };
    Ok(fill)
}
