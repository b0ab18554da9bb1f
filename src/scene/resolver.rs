use crate::art::ArtAsset;
use crate::catalog::{self, Fill, MAT_NOISE_OPACITY, WALL_NEUTRAL};
use crate::geometry::{Insets, Point, Rect, Size, Transform2D};
use crate::model::{FrameConfig, MatConfig, MatTexture, WallConfig};

use super::{Layer, LayerContent, LayerKind, SceneDescription, Shadow};

/// Share of the viewport the artwork may occupy on either axis.
pub const DEFAULT_MAX_ART_FRACTION: f64 = 0.7;

const FRAME_SHADOW_OFFSET: Point = Point::new(0.0, 10.0);
const FRAME_SHADOW_BLUR: f64 = 30.0;
const FRAME_SHADOW_BASE_ALPHA: f64 = 0.3;
const FRAME_SHADOW_ALPHA_PER_DEPTH: f64 = 0.01;
const FRAME_BEVEL_ALPHA: f64 = 0.5;
const MAT_SHADOW_OFFSET: Point = Point::new(1.0, 1.0);
const MAT_SHADOW_BLUR: f64 = 4.0;
const MAT_SHADOW_ALPHA: f64 = 0.2;
const MAT_BEVEL_OFFSET: Point = Point::new(2.0, 2.0);
const MAT_BEVEL_BLUR: f64 = 4.0;
const MAT_BEVEL_ALPHA: f64 = 0.3;
const ART_OUTLINE_BLUR: f64 = 5.0;
const ART_OUTLINE_ALPHA: f64 = 0.5;

/// Turns the configuration model into a [`SceneDescription`] for a fixed viewport.
///
/// Resolution is pure: the same inputs always produce an equal scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionResolver {
    viewport: Size,
    max_art_fraction: f64,
}

impl CompositionResolver {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            max_art_fraction: DEFAULT_MAX_ART_FRACTION,
        }
    }

    pub fn with_max_art_fraction(mut self, fraction: f64) -> Self {
        if fraction.is_finite() && fraction > 0.0 {
            self.max_art_fraction = fraction.min(1.0);
        }
        self
    }

    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    pub const fn max_art_fraction(&self) -> f64 {
        self.max_art_fraction
    }

    /// Displayed art size: natural size fitted into the allowed viewport share, never
    /// enlarged.
    pub fn art_display_size(&self, natural: Size) -> Size {
        natural.fit_within(Size::new(
            self.viewport.width * self.max_art_fraction,
            self.viewport.height * self.max_art_fraction,
        ))
    }

    pub fn resolve(
        &self,
        frame: &FrameConfig,
        mat: &MatConfig,
        wall: &WallConfig,
        art: Option<&ArtAsset>,
    ) -> SceneDescription {
        let mut layers = vec![self.wall_layer(wall)];

        if let Some(art) = art {
            let placement = Transform2D {
                scale: wall.placement_scale(),
                translate: wall.placement_offset().as_point(),
                rotate_degrees: 0,
                pivot: Rect::from_size(self.viewport).center(),
            };
            self.push_composite(&mut layers, frame, mat, art, placement);
        }

        SceneDescription {
            viewport: self.viewport,
            layers,
        }
    }

    fn wall_layer(&self, wall: &WallConfig) -> Layer {
        let fill = catalog::resolve_wall_fill(wall.style(), wall.color(), wall.custom_image())
            .or_else(|err| {
                tracing::debug!(
                    %err,
                    fallback = ?wall.fallback_style(),
                    "wall style unavailable; rendering fallback wall"
                );
                catalog::resolve_wall_fill(wall.fallback_style(), wall.color(), None)
            })
            .unwrap_or(Fill::Solid(WALL_NEUTRAL));

        Layer {
            kind: LayerKind::Wall,
            rect: Rect::from_size(self.viewport),
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            content: LayerContent::Fill(fill),
            shadows: Vec::new(),
            transform: Transform2D::IDENTITY,
        }
    }

    fn push_composite(
        &self,
        layers: &mut Vec<Layer>,
        frame: &FrameConfig,
        mat: &MatConfig,
        art: &ArtAsset,
        placement: Transform2D,
    ) {
        let art_size = self.art_display_size(art.natural_size());
        let mat_padding = if mat.enabled() {
            Insets::uniform(mat.width())
        } else {
            Insets::ZERO
        };
        let frame_padding = Insets::uniform(frame.width());

        let art_rect = Rect::new(
            (self.viewport.width - art_size.width) / 2.0,
            (self.viewport.height - art_size.height) / 2.0,
            art_size.width,
            art_size.height,
        );
        let mat_rect = art_rect.outset(mat_padding);
        let frame_rect = mat_rect.outset(frame_padding);

        let depth = frame.depth();
        layers.push(Layer {
            kind: LayerKind::Frame,
            rect: frame_rect,
            padding: frame_padding,
            margin: Insets::ZERO,
            content: LayerContent::Fill(catalog::resolve_frame_fill(frame.style(), frame.color())),
            shadows: vec![
                Shadow::drop(
                    FRAME_SHADOW_OFFSET,
                    FRAME_SHADOW_BLUR,
                    frame_shadow_alpha(depth),
                ),
                Shadow::inset(Point::ZERO, frame_bevel_thickness(depth), FRAME_BEVEL_ALPHA),
            ],
            transform: placement,
        });

        let mut art_shadows = Vec::new();
        if mat.enabled() {
            layers.push(Layer {
                kind: LayerKind::Mat,
                rect: mat_rect,
                padding: mat_padding,
                margin: Insets::ZERO,
                content: LayerContent::Fill(mat_fill(mat)),
                shadows: vec![Shadow::inset(
                    MAT_SHADOW_OFFSET,
                    MAT_SHADOW_BLUR,
                    MAT_SHADOW_ALPHA,
                )],
                transform: placement,
            });
            layers.push(Layer {
                kind: LayerKind::MatBevel,
                rect: mat_rect.inset(mat_padding),
                padding: Insets::ZERO,
                margin: mat_padding,
                content: LayerContent::None,
                shadows: vec![Shadow::inset(
                    MAT_BEVEL_OFFSET,
                    MAT_BEVEL_BLUR,
                    MAT_BEVEL_ALPHA,
                )],
                transform: placement,
            });
        } else {
            art_shadows.push(Shadow::drop(Point::ZERO, ART_OUTLINE_BLUR, ART_OUTLINE_ALPHA));
        }

        layers.push(Layer {
            kind: LayerKind::Art,
            rect: art_rect,
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            content: LayerContent::Art(art.image().clone()),
            shadows: art_shadows,
            transform: placement.with_rotation(art.rotation_degrees()),
        });
    }
}

/// Drop shadow darkens with depth: 0.3 at depth 0 up to 0.6 at depth 30.
pub fn frame_shadow_alpha(depth: f64) -> f64 {
    FRAME_SHADOW_BASE_ALPHA + FRAME_SHADOW_ALPHA_PER_DEPTH * depth
}

pub fn frame_bevel_thickness(depth: f64) -> f64 {
    depth / 2.0
}

fn mat_fill(mat: &MatConfig) -> Fill {
    match mat.texture() {
        MatTexture::Smooth => Fill::Solid(mat.color()),
        MatTexture::Textured => Fill::Noise {
            base: mat.color(),
            opacity: MAT_NOISE_OPACITY,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::ImageHandle;
    use crate::catalog::TextureMode;
    use crate::geometry::Color;
    use crate::model::{FrameStyle, WallStyle};
    use crate::scene::ShadowKind;

    fn art(width: u32, height: u32) -> ArtAsset {
        ArtAsset::new(
            ImageHandle::new(image::DynamicImage::new_rgba8(width, height)),
            "piece.png",
        )
    }

    fn resolver() -> CompositionResolver {
        CompositionResolver::new(Size::new(1000.0, 1000.0))
    }

    #[test]
    fn default_configuration_produces_five_ordered_layers() {
        let art = art(400, 300);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            Some(&art),
        );

        assert_eq!(
            scene.kinds(),
            vec![
                LayerKind::Wall,
                LayerKind::Frame,
                LayerKind::Mat,
                LayerKind::MatBevel,
                LayerKind::Art,
            ]
        );
        let frame = scene.layer(LayerKind::Frame).unwrap();
        assert_eq!(frame.padding, Insets::uniform(40.0));
        assert_eq!(frame.rect.width, 400.0 + 2.0 * 50.0 + 2.0 * 40.0);
        let mat = scene.layer(LayerKind::Mat).unwrap();
        assert_eq!(mat.padding, Insets::uniform(50.0));
        assert_eq!(mat.fill(), Some(&Fill::Solid(Color::WHITE)));
        let wall = scene.layer(LayerKind::Wall).unwrap();
        assert!(matches!(
            wall.fill(),
            Some(Fill::Texture {
                mode: TextureMode::Tile,
                ..
            })
        ));
    }

    #[test]
    fn resolution_is_deterministic() {
        let art = art(640, 480);
        let mut frame = FrameConfig::default();
        frame.set_style(FrameStyle::OakWood);
        let mut wall = WallConfig::default();
        wall.set_placement_scale(0.8);
        wall.set_placement_offset(30.0, -20.0);
        let mat = MatConfig::default();

        let first = resolver().resolve(&frame, &mat, &wall, Some(&art));
        let second = resolver().resolve(&frame, &mat, &wall, Some(&art));
        assert_eq!(first, second);
    }

    #[test]
    fn frame_shadow_darkens_with_depth() {
        let art = art(100, 100);
        let mut frame = FrameConfig::default();
        for (depth, expected_alpha) in [(0.0, 0.3), (30.0, 0.6)] {
            frame.set_depth(depth);
            let scene = resolver().resolve(
                &frame,
                &MatConfig::default(),
                &WallConfig::default(),
                Some(&art),
            );
            let shadows = &scene.layer(LayerKind::Frame).unwrap().shadows;
            assert_eq!(shadows[0].kind, ShadowKind::Drop);
            assert!((shadows[0].color.alpha - expected_alpha).abs() < 1e-9);
            assert_eq!(shadows[1].kind, ShadowKind::Inset);
            assert_eq!(shadows[1].blur, depth / 2.0);
        }
    }

    #[test]
    fn disabled_mat_is_omitted_and_art_gets_outline() {
        let art = art(200, 100);
        let mut mat = MatConfig::default();
        mat.set_enabled(false);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &mat,
            &WallConfig::default(),
            Some(&art),
        );

        assert_eq!(
            scene.kinds(),
            vec![LayerKind::Wall, LayerKind::Frame, LayerKind::Art]
        );
        let frame = scene.layer(LayerKind::Frame).unwrap();
        let art_layer = scene.layer(LayerKind::Art).unwrap();
        assert_eq!(frame.rect.inset(frame.padding), art_layer.rect);
        assert_eq!(art_layer.shadows.len(), 1);
        assert_eq!(art_layer.shadows[0].blur, 5.0);
    }

    #[test]
    fn mat_bevel_tracks_inner_edge_of_mat() {
        let art = art(300, 300);
        let mut mat = MatConfig::default();
        mat.set_width(80.0);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &mat,
            &WallConfig::default(),
            Some(&art),
        );

        let mat_layer = scene.layer(LayerKind::Mat).unwrap();
        let bevel = scene.layer(LayerKind::MatBevel).unwrap();
        assert_eq!(bevel.margin, Insets::uniform(80.0));
        assert_eq!(bevel.rect, mat_layer.rect.inset(Insets::uniform(80.0)));
        assert_eq!(bevel.rect, scene.layer(LayerKind::Art).unwrap().rect);
    }

    #[test]
    fn textured_mat_uses_noise_overlay() {
        let art = art(100, 100);
        let mut mat = MatConfig::default();
        mat.set_texture(MatTexture::Textured);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &mat,
            &WallConfig::default(),
            Some(&art),
        );
        assert_eq!(
            scene.layer(LayerKind::Mat).unwrap().fill(),
            Some(&Fill::Noise {
                base: Color::WHITE,
                opacity: MAT_NOISE_OPACITY
            })
        );
    }

    #[test]
    fn placement_moves_composite_but_not_wall() {
        let art = art(100, 100);
        let mut wall = WallConfig::default();
        wall.set_placement_scale(2.0);
        wall.set_placement_offset(100.0, 0.0);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &wall,
            Some(&art),
        );

        let wall_layer = scene.layer(LayerKind::Wall).unwrap();
        assert!(wall_layer.transform.is_identity());
        assert_eq!(wall_layer.rect, Rect::new(0.0, 0.0, 1000.0, 1000.0));

        let art_layer = scene.layer(LayerKind::Art).unwrap();
        let placed = art_layer.placed_rect();
        assert_eq!(placed.width, 200.0);
        assert_eq!(placed.center(), Point::new(600.0, 500.0));
    }

    #[test]
    fn art_is_fitted_without_upscaling_and_keeps_rotation() {
        let mut big = art(4000, 2000);
        big.rotate();
        big.rotate();
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            Some(&big),
        );
        let art_layer = scene.layer(LayerKind::Art).unwrap();
        assert!((art_layer.rect.width - 700.0).abs() < 1e-9);
        assert!((art_layer.rect.height - 350.0).abs() < 1e-9);
        assert_eq!(art_layer.transform.rotate_degrees, 180);
        assert_eq!(scene.art_widths(), Some((4000.0, art_layer.rect.width)));

        let small = art(120, 80);
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            Some(&small),
        );
        assert_eq!(
            scene.layer(LayerKind::Art).unwrap().rect.size(),
            Size::new(120.0, 80.0)
        );
    }

    #[test]
    fn missing_custom_wall_image_falls_back_to_previous_style() {
        let art = art(100, 100);
        let mut wall = WallConfig::default();
        wall.set_style(WallStyle::SolidColor);
        wall.set_color(Color::from_hex(0x334455));
        wall.set_style(WallStyle::CustomImage);

        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &wall,
            Some(&art),
        );
        assert_eq!(
            scene.layer(LayerKind::Wall).unwrap().fill(),
            Some(&Fill::Solid(Color::from_hex(0x334455)))
        );
    }

    #[test]
    fn empty_state_renders_only_the_wall() {
        let scene = resolver().resolve(
            &FrameConfig::default(),
            &MatConfig::default(),
            &WallConfig::default(),
            None,
        );
        assert_eq!(scene.kinds(), vec![LayerKind::Wall]);
        assert!(scene.art_widths().is_none());
        assert!(scene.composite_bounds().is_none());
    }
}
