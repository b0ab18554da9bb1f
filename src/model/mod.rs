//! Frame, mat and wall value objects.

mod frame;
mod mat;
mod wall;

use serde::{Deserialize, Serialize};

pub use frame::{
    FrameConfig, FrameStyle, DEFAULT_FRAME_COLOR, DEFAULT_FRAME_DEPTH, DEFAULT_FRAME_WIDTH,
    FRAME_DEPTH_MAX, FRAME_DEPTH_MIN, FRAME_WIDTH_MAX, FRAME_WIDTH_MIN,
};
pub use mat::{
    MatConfig, MatTexture, DEFAULT_MAT_COLOR, DEFAULT_MAT_WIDTH, MAT_WIDTH_MAX, MAT_WIDTH_MIN,
};
pub use wall::{
    PlacementOffset, WallConfig, WallStyle, DEFAULT_PLACEMENT_SCALE, DEFAULT_WALL_COLOR,
    PLACEMENT_OFFSET_LIMIT, PLACEMENT_SCALE_MAX, PLACEMENT_SCALE_MIN,
};

/// The three independently edited configuration objects, as stored in a theme preset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub frame: FrameConfig,
    pub mat: MatConfig,
    pub wall: WallConfig,
}

impl Configuration {
    pub fn new(frame: FrameConfig, mat: MatConfig, wall: WallConfig) -> Self {
        Self { frame, mat, wall }
    }

    pub fn into_parts(self) -> (FrameConfig, MatConfig, WallConfig) {
        (self.frame, self.mat, self.wall)
    }
}

/// Slider semantics: out-of-range input lands on the nearest bound, non-finite input on
/// the field default.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
