//! Uploaded artwork: decoded image handles plus the rotate/crop state applied on top.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};
use thiserror::Error;

use crate::crop::{self, CropSelection};
use crate::geometry::{PixelRect, Size};

const DEFAULT_BASE_NAME: &str = "artwork";
pub const ROTATION_STEP_DEGREES: i32 = 90;

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("decoded image {path} has no pixels")]
    EmptyImage { path: PathBuf },
}

pub type ArtResult<T> = std::result::Result<T, ArtError>;

/// Shared reference to a decoded image. Two handles are equal when they point at the same
/// decoded buffer.
#[derive(Clone)]
pub struct ImageHandle(Arc<DynamicImage>);

impl ImageHandle {
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn natural_size(&self) -> Size {
        let (width, height) = self.dimensions();
        Size::new(f64::from(width), f64::from(height))
    }

    pub fn same_image(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_image(other)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("ImageHandle")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

pub fn decode(path: &Path) -> ArtResult<ImageHandle> {
    let image = image::open(path).map_err(|source| ArtError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ArtError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(ImageHandle::new(image))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtAsset {
    original: ImageHandle,
    image: ImageHandle,
    base_name: String,
    rotation_degrees: i32,
    cropped_extent: Option<PixelRect>,
}

impl ArtAsset {
    pub fn new(image: ImageHandle, file_name: &str) -> Self {
        Self {
            original: image.clone(),
            image,
            base_name: base_file_name(file_name),
            rotation_degrees: 0,
            cropped_extent: None,
        }
    }

    pub fn open(path: &Path) -> ArtResult<Self> {
        let image = decode(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        Ok(Self::new(image, file_name))
    }

    /// Image currently shown in the frame (cropped when a crop was applied).
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// The unmodified upload; every crop starts from here.
    pub fn original(&self) -> &ImageHandle {
        &self.original
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub const fn rotation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    pub const fn cropped_extent(&self) -> Option<PixelRect> {
        self.cropped_extent
    }

    pub fn natural_size(&self) -> Size {
        self.image.natural_size()
    }

    /// Accumulates without wrapping: four quarter turns store 360.
    pub fn rotate(&mut self) {
        self.rotation_degrees = self.rotation_degrees.saturating_add(ROTATION_STEP_DEGREES);
    }

    /// Replaces the displayed image with a crop of the original upload.
    pub fn apply_crop(&mut self, selection: &CropSelection) {
        match crop::crop_extent(self.original.dimensions(), selection) {
            Some(extent) => {
                let cropped = crop::crop_image(self.original.image(), extent);
                tracing::debug!(?extent, "applied art crop");
                self.image = ImageHandle::new(cropped);
                self.cropped_extent = Some(extent);
            }
            None => {
                tracing::debug!("degenerate crop selection; restoring original art");
                self.reset_crop();
            }
        }
    }

    pub fn reset_crop(&mut self) {
        self.image = self.original.clone();
        self.cropped_extent = None;
    }
}

/// File name up to the first `.`, or `artwork` when that is empty.
pub fn base_file_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default().trim();
    if stem.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        stem.to_string()
    }
}
