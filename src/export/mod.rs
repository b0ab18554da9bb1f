//! Rasterizes a resolved scene at one of two quality tiers and writes it out as PNG.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::scene::SceneDescription;

pub const SCREEN_SCALE: f64 = 2.0;
pub const MIN_ORIGINAL_SCALE: f64 = 2.0;
pub const MAX_ORIGINAL_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportQuality {
    /// Twice the on-screen size.
    #[default]
    Screen,
    /// Enough scale to reproduce the artwork at its natural resolution, within limits.
    Original,
}

impl ExportQuality {
    pub const fn file_suffix(self) -> &'static str {
        match self {
            ExportQuality::Screen => "framed",
            ExportQuality::Original => "high-res",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Output pixels per viewport unit.
    pub scale: f64,
    /// Paint the wall too; otherwise only the framed composite is drawn on transparency.
    pub include_wall: bool,
}

impl RasterOptions {
    pub const fn composite_only(scale: f64) -> Self {
        Self {
            scale,
            include_wall: false,
        }
    }
}

/// Black-box scene renderer.
pub trait Rasterizer {
    fn render(&self, scene: &SceneDescription, options: &RasterOptions) -> anyhow::Result<RgbaImage>;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,
    #[error("nothing to export: no artwork is framed")]
    NothingToExport,
    #[error("failed to rasterize scene: {0:#}")]
    Rasterize(anyhow::Error),
    #[error("failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub path: PathBuf,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

pub fn export_scale(scene: &SceneDescription, quality: ExportQuality) -> f64 {
    match quality {
        ExportQuality::Screen => SCREEN_SCALE,
        ExportQuality::Original => original_scale(scene.art_widths()),
    }
}

/// `natural / rendered` clamped to the allowed range; unknown widths use the minimum.
pub fn original_scale(art_widths: Option<(f64, f64)>) -> f64 {
    match art_widths {
        Some((natural, rendered)) if natural > 0.0 && rendered > 0.0 => {
            (natural / rendered).clamp(MIN_ORIGINAL_SCALE, MAX_ORIGINAL_SCALE)
        }
        _ => MIN_ORIGINAL_SCALE,
    }
}

pub fn export_file_name(base_name: &str, quality: ExportQuality) -> String {
    format!("{base_name}-{}.png", quality.file_suffix())
}

#[derive(Debug)]
pub struct ExportPipeline<R: Rasterizer> {
    rasterizer: R,
    output_dir: PathBuf,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when dropped, including on early error returns.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<R: Rasterizer> ExportPipeline<R> {
    pub fn new(rasterizer: R, output_dir: PathBuf) -> Self {
        Self {
            rasterizer,
            output_dir,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> ExportResult<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }

    pub fn export(
        &self,
        scene: &SceneDescription,
        quality: ExportQuality,
        base_name: &str,
    ) -> ExportResult<ExportOutput> {
        let _guard = self.begin()?;
        if !scene.has_art() {
            return Err(ExportError::NothingToExport);
        }

        let scale = export_scale(scene, quality);
        tracing::debug!(?quality, scale, "rasterizing scene for export");
        let bitmap = self
            .rasterizer
            .render(scene, &RasterOptions::composite_only(scale))
            .map_err(ExportError::Rasterize)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.output_dir.join(export_file_name(base_name, quality));
        bitmap
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| ExportError::Encode {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), scale, width = bitmap.width(), height = bitmap.height(), "exported framed image");
        Ok(ExportOutput {
            path,
            scale,
            width: bitmap.width(),
            height: bitmap.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::{ArtAsset, ImageHandle};
    use crate::geometry::Size;
    use crate::model::{FrameConfig, MatConfig, WallConfig};
    use crate::scene::CompositionResolver;
    use image::DynamicImage;
    use std::cell::Cell;

    struct FixedRasterizer {
        calls: Cell<usize>,
        last_scale: Cell<f64>,
        fail: bool,
    }

    impl FixedRasterizer {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                last_scale: Cell::new(0.0),
                fail,
            }
        }
    }

    impl Rasterizer for FixedRasterizer {
        fn render(
            &self,
            _scene: &SceneDescription,
            options: &RasterOptions,
        ) -> anyhow::Result<RgbaImage> {
            self.calls.set(self.calls.get() + 1);
            self.last_scale.set(options.scale);
            if self.fail {
                anyhow::bail!("canvas too large");
            }
            Ok(RgbaImage::new(4, 3))
        }
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        root.push(format!("artframe-export-{}-{nanos}", std::process::id()));
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn scene_with_art(width: u32, height: u32) -> SceneDescription {
        let art = ArtAsset::new(
            ImageHandle::new(DynamicImage::new_rgba8(width, height)),
            "sunset.jpg",
        );
        CompositionResolver::new(Size::new(1000.0, 1000.0)).resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            Some(&art),
        )
    }

    #[test]
    fn original_scale_is_clamped_ratio_of_widths() {
        assert_eq!(original_scale(Some((4000.0, 400.0))), 10.0);
        assert_eq!(original_scale(Some((4000.0, 4000.0))), 2.0);
        assert_eq!(original_scale(Some((4000.0, 50.0))), 20.0);
        assert_eq!(original_scale(Some((4000.0, 0.0))), 2.0);
        assert_eq!(original_scale(None), 2.0);
    }

    #[test]
    fn export_scale_uses_displayed_art_width() {
        // 2800 wide art fits into 700 px of a 1000 px viewport.
        let scene = scene_with_art(2800, 1400);
        assert_eq!(export_scale(&scene, ExportQuality::Original), 4.0);
        assert_eq!(export_scale(&scene, ExportQuality::Screen), SCREEN_SCALE);
    }

    #[test]
    fn file_names_follow_quality_suffix() {
        assert_eq!(export_file_name("sunset", ExportQuality::Screen), "sunset-framed.png");
        assert_eq!(
            export_file_name("sunset", ExportQuality::Original),
            "sunset-high-res.png"
        );
    }

    #[test]
    fn export_writes_png_into_output_dir() {
        with_temp_root(|root| {
            let pipeline = ExportPipeline::new(FixedRasterizer::new(false), root.join("out"));
            let output = pipeline
                .export(&scene_with_art(100, 50), ExportQuality::Screen, "sunset")
                .expect("export should succeed");

            assert_eq!(output.path, root.join("out").join("sunset-framed.png"));
            assert_eq!((output.width, output.height), (4, 3));
            let written = image::open(&output.path).expect("png should decode");
            assert_eq!(written.width(), 4);
            assert!(!pipeline.is_busy());
        });
    }

    #[test]
    fn rasterizer_failure_is_reported_and_releases_guard() {
        with_temp_root(|root| {
            let pipeline = ExportPipeline::new(FixedRasterizer::new(true), root.to_path_buf());
            let err = pipeline
                .export(&scene_with_art(100, 50), ExportQuality::Original, "sunset")
                .unwrap_err();
            assert!(matches!(err, ExportError::Rasterize(_)));
            assert!(err.to_string().contains("canvas too large"));
            assert!(!pipeline.is_busy());
            assert!(!root.join("sunset-high-res.png").exists());
        });
    }

    #[test]
    fn second_export_while_in_flight_is_rejected() {
        let pipeline = ExportPipeline::new(FixedRasterizer::new(false), PathBuf::from("."));
        let guard = pipeline.begin().expect("first export should start");
        assert!(pipeline.is_busy());

        let err = pipeline
            .export(&scene_with_art(10, 10), ExportQuality::Screen, "x")
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert_eq!(pipeline.rasterizer().calls.get(), 0);

        drop(guard);
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn scene_without_art_is_not_exported() {
        let scene = CompositionResolver::new(Size::new(800.0, 600.0)).resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            None,
        );
        let pipeline = ExportPipeline::new(FixedRasterizer::new(false), PathBuf::from("."));
        assert!(matches!(
            pipeline.export(&scene, ExportQuality::Screen, "x"),
            Err(ExportError::NothingToExport)
        ));
        assert_eq!(pipeline.rasterizer().last_scale.get(), 0.0);
    }
}
