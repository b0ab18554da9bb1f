use image::DynamicImage;

use crate::art::ImageHandle;
use crate::geometry::{PixelRect, Rect, Size};

/// Share of the displayed width covered by the selection offered when cropping starts.
const INITIAL_SELECTION_WIDTH_FRACTION: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropPreset {
    Free,
    #[default]
    Ratio16x9,
    Ratio1x1,
    Ratio9x16,
    Original,
}

impl CropPreset {
    pub const ALL: [CropPreset; 5] = [
        Self::Free,
        Self::Ratio16x9,
        Self::Ratio1x1,
        Self::Ratio9x16,
        Self::Original,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Ratio16x9 => "16:9",
            Self::Ratio1x1 => "1:1",
            Self::Ratio9x16 => "9:16",
            Self::Original => "Original",
        }
    }

    pub const fn ratio(self) -> Option<(u32, u32)> {
        match self {
            Self::Ratio16x9 => Some((16, 9)),
            Self::Ratio1x1 => Some((1, 1)),
            Self::Ratio9x16 => Some((9, 16)),
            Self::Free | Self::Original => None,
        }
    }

    /// Effective aspect ratio; `Original` follows the image and `Free` has none.
    pub fn resolve_ratio(self, image_width: u32, image_height: u32) -> Option<(u32, u32)> {
        self.ratio().or_else(|| {
            if self == Self::Original {
                Some((image_width.max(1), image_height.max(1)))
            } else {
                None
            }
        })
    }

    /// Centered starting selection in display pixels: 90% of the displayed width, shrunk
    /// to fit vertically when the preset ratio would overflow.
    pub fn initial_selection(self, displayed: Size) -> Rect {
        if displayed.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        let mut width = displayed.width * INITIAL_SELECTION_WIDTH_FRACTION;
        let ratio = self
            .resolve_ratio(displayed.width.round() as u32, displayed.height.round() as u32)
            .map(|(w, h)| f64::from(w) / f64::from(h));
        let height = match ratio {
            Some(ratio) => {
                let mut height = width / ratio;
                if height > displayed.height {
                    height = displayed.height;
                    width = height * ratio;
                }
                height
            }
            None => displayed.height * INITIAL_SELECTION_WIDTH_FRACTION,
        };
        Rect::new(
            (displayed.width - width) / 2.0,
            (displayed.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// A crop gesture result: the selection in display pixels plus the two sizes needed to map
/// it back to source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSelection {
    pub display_rect: Rect,
    pub natural_size: Size,
    pub rendered_size: Size,
}

impl CropSelection {
    pub const fn new(display_rect: Rect, natural_size: Size, rendered_size: Size) -> Self {
        Self {
            display_rect,
            natural_size,
            rendered_size,
        }
    }

    /// Independent X/Y factors from display space to natural pixel space.
    pub fn scale_factors(&self) -> (f64, f64) {
        let ratio = |natural: f64, rendered: f64| {
            if natural > 0.0 && rendered > 0.0 {
                natural / rendered
            } else {
                1.0
            }
        };
        (
            ratio(self.natural_size.width, self.rendered_size.width),
            ratio(self.natural_size.height, self.rendered_size.height),
        )
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.display_rect.width > 0.0 && self.display_rect.height > 0.0)
    }
}

/// Source-pixel rectangle for `selection`, clamped to the image. `None` means no crop was
/// requested (a click without drag, or a selection entirely outside the image).
pub fn crop_extent(image_dimensions: (u32, u32), selection: &CropSelection) -> Option<PixelRect> {
    if selection.is_degenerate() {
        return None;
    }
    let (image_width, image_height) = image_dimensions;
    let (scale_x, scale_y) = selection.scale_factors();
    let rect = selection.display_rect;

    let left = (rect.x * scale_x).round().clamp(0.0, f64::from(image_width));
    let top = (rect.y * scale_y).round().clamp(0.0, f64::from(image_height));
    let right = ((rect.x + rect.width) * scale_x)
        .round()
        .clamp(0.0, f64::from(image_width));
    let bottom = ((rect.y + rect.height) * scale_y)
        .round()
        .clamp(0.0, f64::from(image_height));

    let width = (right - left) as u32;
    let height = (bottom - top) as u32;
    if width == 0 || height == 0 {
        return None;
    }
    Some(PixelRect::new(left as u32, top as u32, width, height))
}

pub fn crop_image(image: &DynamicImage, extent: PixelRect) -> DynamicImage {
    image.crop_imm(extent.x, extent.y, extent.width, extent.height)
}

/// Crops the original upload. Degenerate selections hand back the original handle itself.
pub fn apply_crop(original: &ImageHandle, selection: &CropSelection) -> ImageHandle {
    match crop_extent(original.dimensions(), selection) {
        Some(extent) => ImageHandle::new(crop_image(original.image(), extent)),
        None => original.clone(),
    }
}
