//! Top-level session state: the configuration being edited, the uploaded artwork, the theme
//! library and the export pipeline.

use std::path::Path;

use crate::art::{self, ArtAsset, ImageHandle};
use crate::config::AppConfig;
use crate::crop::{CropPreset, CropSelection};
use crate::error::{AppError, AppResult};
use crate::export::{ExportOutput, ExportPipeline, ExportQuality, Rasterizer};
use crate::geometry::{Rect, Size};
use crate::model::{Configuration, FrameConfig, MatConfig, WallConfig, WallStyle};
use crate::notification::{Notice, NoticeBoard};
use crate::scene::{CompositionResolver, SceneDescription};
use crate::state::{StateMachine, StudioEvent, StudioState};
use crate::storage::KeyValueStore;
use crate::theme::{self, ThemeLibrary, ThemePreset};

pub struct Studio<S: KeyValueStore, R: Rasterizer> {
    frame: FrameConfig,
    mat: MatConfig,
    wall: WallConfig,
    art: Option<ArtAsset>,
    crop_preset: CropPreset,
    library: ThemeLibrary<S>,
    resolver: CompositionResolver,
    exporter: ExportPipeline<R>,
    machine: StateMachine,
    notices: NoticeBoard,
}

impl<S: KeyValueStore, R: Rasterizer> Studio<S, R> {
    /// Starts from the library's default theme, or the built-in defaults.
    pub fn new(library: ThemeLibrary<S>, resolver: CompositionResolver, exporter: ExportPipeline<R>) -> Self {
        let (frame, mat, wall) = library.initial_configuration().into_parts();
        Self {
            frame,
            mat,
            wall,
            art: None,
            crop_preset: CropPreset::default(),
            library,
            resolver,
            exporter,
            machine: StateMachine::new(),
            notices: NoticeBoard::new(),
        }
    }

    pub fn with_app_config(store: S, rasterizer: R, config: &AppConfig) -> Self {
        let resolver =
            CompositionResolver::new(config.viewport()).with_max_art_fraction(config.max_art_fraction());
        let exporter = ExportPipeline::new(rasterizer, config.export_dir());
        Self::new(ThemeLibrary::load(store), resolver, exporter)
    }

    pub fn state(&self) -> StudioState {
        self.machine.state()
    }

    pub fn frame(&self) -> &FrameConfig {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut FrameConfig {
        &mut self.frame
    }

    pub fn mat(&self) -> &MatConfig {
        &self.mat
    }

    pub fn mat_mut(&mut self) -> &mut MatConfig {
        &mut self.mat
    }

    pub fn wall(&self) -> &WallConfig {
        &self.wall
    }

    pub fn wall_mut(&mut self) -> &mut WallConfig {
        &mut self.wall
    }

    pub fn configuration(&self) -> Configuration {
        Configuration::new(self.frame.clone(), self.mat.clone(), self.wall.clone())
    }

    pub fn art(&self) -> Option<&ArtAsset> {
        self.art.as_ref()
    }

    pub fn library(&self) -> &ThemeLibrary<S> {
        &self.library
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.active()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.dismiss()
    }

    /// Decodes and installs a new artwork. A file that cannot be decoded leaves the studio
    /// as it was.
    pub fn upload(&mut self, path: &Path) -> AppResult<()> {
        self.ensure(StudioEvent::Upload)?;
        let asset = ArtAsset::open(path).inspect_err(|err| {
            self.notices.post(Notice::error(format!("Could not open image: {err}")));
        })?;
        self.install_art(asset)
    }

    pub fn upload_image(&mut self, image: ImageHandle, file_name: &str) -> AppResult<()> {
        self.ensure(StudioEvent::Upload)?;
        self.install_art(ArtAsset::new(image, file_name))
    }

    fn install_art(&mut self, asset: ArtAsset) -> AppResult<()> {
        self.machine.transition(StudioEvent::Upload)?;
        tracing::info!(base_name = asset.base_name(), size = ?asset.natural_size(), "artwork uploaded");
        self.art = Some(asset);
        Ok(())
    }

    /// Drops the artwork; the frame, mat and wall settings are kept.
    pub fn reset(&mut self) -> AppResult<()> {
        self.machine.transition(StudioEvent::Reset)?;
        self.art = None;
        Ok(())
    }

    pub fn rotate(&mut self) -> AppResult<i32> {
        let art = self.art.as_mut().ok_or(AppError::NoArtwork)?;
        art.rotate();
        Ok(art.rotation_degrees())
    }

    pub fn toggle_mat(&mut self) -> bool {
        self.mat.toggle();
        self.mat.enabled()
    }

    pub fn set_wall_image(&mut self, image: ImageHandle) {
        self.wall.set_custom_image(Some(image));
        self.wall.set_style(WallStyle::CustomImage);
    }

    pub fn upload_wall_image(&mut self, path: &Path) -> AppResult<()> {
        let image = art::decode(path)?;
        self.set_wall_image(image);
        Ok(())
    }

    pub fn crop_preset(&self) -> CropPreset {
        self.crop_preset
    }

    pub fn set_crop_preset(&mut self, preset: CropPreset) {
        self.crop_preset = preset;
    }

    /// Size at which the uncropped original is shown while selecting.
    pub fn crop_display_size(&self) -> Option<Size> {
        self.art
            .as_ref()
            .map(|art| self.resolver.art_display_size(art.original().natural_size()))
    }

    /// Enters crop mode and returns the suggested selection in display pixels.
    pub fn begin_crop(&mut self) -> AppResult<Rect> {
        let displayed = self.crop_display_size().ok_or(AppError::NoArtwork)?;
        self.machine.transition(StudioEvent::BeginCrop)?;
        Ok(self.crop_preset.initial_selection(displayed))
    }

    pub fn finish_crop(&mut self, display_rect: Rect) -> AppResult<()> {
        self.ensure(StudioEvent::FinishCrop)?;
        let rendered = self.crop_display_size().ok_or(AppError::NoArtwork)?;
        let art = self.art.as_mut().ok_or(AppError::NoArtwork)?;
        let selection = CropSelection::new(display_rect, art.original().natural_size(), rendered);
        art.apply_crop(&selection);
        self.machine.transition(StudioEvent::FinishCrop)?;
        Ok(())
    }

    pub fn cancel_crop(&mut self) -> AppResult<()> {
        self.machine.transition(StudioEvent::CancelCrop)?;
        Ok(())
    }

    pub fn themes(&self) -> Vec<&ThemePreset> {
        self.library.list()
    }

    pub fn apply_theme(&mut self, id: &str) -> AppResult<()> {
        let (frame, mat, wall) = self.library.apply_id(id)?;
        self.frame = frame;
        self.mat = mat;
        self.wall = wall;
        tracing::debug!(id, "applied theme");
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: &ThemePreset) {
        (self.frame, self.mat, self.wall) = theme::apply(preset);
    }

    pub fn save_theme(&mut self, name: &str) -> ThemePreset {
        let preset = self.library.save(name, &self.frame, &self.mat, &self.wall);
        self.notices
            .post(Notice::info(format!("Saved theme \"{}\"", preset.label)));
        preset
    }

    pub fn delete_theme(&mut self, id: &str) -> bool {
        self.library.delete(id)
    }

    pub fn toggle_default_theme(&mut self, id: &str) -> Option<&str> {
        self.library.toggle_default(id)
    }

    pub fn scene(&self) -> SceneDescription {
        self.resolver
            .resolve(&self.frame, &self.mat, &self.wall, self.art.as_ref())
    }

    /// Exports the current composite. Export failures become a notice and yield `None`;
    /// only calls made in the wrong state are errors.
    pub fn export(&mut self, quality: ExportQuality) -> AppResult<Option<ExportOutput>> {
        let base_name = self
            .art
            .as_ref()
            .map(|art| art.base_name().to_string())
            .ok_or(AppError::NoArtwork)?;
        self.machine.transition(StudioEvent::BeginExport)?;

        let scene = self.scene();
        let result = self.exporter.export(&scene, quality, &base_name);
        self.machine.transition(StudioEvent::FinishExport)?;

        match result {
            Ok(output) => {
                self.notices
                    .post(Notice::info(format!("Exported {}", output.path.display())));
                Ok(Some(output))
            }
            Err(err) => {
                tracing::warn!(%err, ?quality, "export failed");
                self.notices.post(Notice::error(format!("Export failed: {err}")));
                Ok(None)
            }
        }
    }

    fn ensure(&self, event: StudioEvent) -> AppResult<()> {
        if self.machine.can_transition(event) {
            return Ok(());
        }
        Err(crate::state::StateError::InvalidStateTransition {
            from: self.machine.state(),
            event,
        }
        .into())
    }
}
