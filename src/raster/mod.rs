//! Reference CPU rasterizer for scene descriptions, built on `vello_cpu`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use image::{DynamicImage, RgbaImage};
use vello_cpu::kurbo::{Affine, Point as PaintPoint, Rect as PaintRect, Shape, Vec2};
use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{
    Color as PaintColor, ColorStop, Extend, Gradient, GradientKind, ImageSampler,
    LinearGradientPosition,
};
use vello_cpu::{ImageSource, Pixmap, RenderContext};

use crate::art::{self, ImageHandle};
use crate::catalog::{Fill, LinearGradient, TextureMode, TEXTURE_ASSETS};
use crate::export::{RasterOptions, Rasterizer};
use crate::geometry::{Color, Rect, Transform2D};
use crate::scene::{Layer, LayerContent, LayerKind, SceneDescription, Shadow, ShadowKind};

/// Largest bitmap side this rasterizer will allocate.
pub const MAX_CANVAS_SIDE: u32 = 16_384;
const NOISE_TILE_SIDE: u16 = 64;
const CLIP_TOLERANCE: f64 = 0.1;

/// Paints scenes with `vello_cpu`. Textures are drawn from registered images; an
/// unregistered texture falls back to its base color.
#[derive(Debug, Default)]
pub struct CpuRasterizer {
    textures: HashMap<String, ImageHandle>,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, asset: &str, image: ImageHandle) -> Self {
        self.register_texture(asset, image);
        self
    }

    pub fn register_texture(&mut self, asset: &str, image: ImageHandle) {
        self.textures.insert(asset.to_string(), image);
    }

    pub fn has_texture(&self, asset: &str) -> bool {
        self.textures.contains_key(asset)
    }

    /// Registers every catalog texture found in `dir`, returning how many were loaded.
    /// Missing or undecodable files are skipped.
    pub fn load_textures(&mut self, dir: &Path) -> usize {
        let mut loaded = 0;
        for asset in TEXTURE_ASSETS {
            let path = dir.join(asset);
            if !path.exists() {
                tracing::debug!(path = %path.display(), "wall texture not found");
                continue;
            }
            match art::decode(&path) {
                Ok(image) => {
                    self.register_texture(asset, image);
                    loaded += 1;
                }
                Err(err) => tracing::warn!(%err, "failed to load wall texture"),
            }
        }
        loaded
    }

    fn paint_layer(&self, ctx: &mut RenderContext, base: Affine, layer: &Layer) -> anyhow::Result<()> {
        let transform = base * placement_affine(&layer.transform);
        let rect = paint_rect(layer.rect);
        ctx.set_transform(transform);
        ctx.set_paint_transform(Affine::IDENTITY);

        for shadow in layer.shadows.iter().filter(|s| s.kind == ShadowKind::Drop) {
            paint_drop_shadow(ctx, rect, shadow);
        }

        match &layer.content {
            LayerContent::Fill(fill) => self.paint_fill(ctx, transform, rect, fill)?,
            LayerContent::Art(image) => paint_art(
                ctx,
                transform,
                layer.rect,
                image.image(),
                layer.transform.rotate_degrees,
            )?,
            LayerContent::None => {}
        }

        for shadow in layer.shadows.iter().filter(|s| s.kind == ShadowKind::Inset) {
            paint_inset_shadow(ctx, rect, shadow);
        }
        Ok(())
    }

    fn paint_fill(
        &self,
        ctx: &mut RenderContext,
        transform: Affine,
        rect: PaintRect,
        fill: &Fill,
    ) -> anyhow::Result<()> {
        match fill {
            Fill::Solid(color) => {
                ctx.set_paint(paint_color(*color, 1.0));
                ctx.fill_rect(&rect);
            }
            Fill::Gradient(gradient) => {
                ctx.set_paint(linear_gradient(gradient, rect));
                ctx.fill_rect(&rect);
            }
            Fill::Texture { asset, base, mode } => {
                ctx.set_paint(paint_color(*base, 1.0));
                ctx.fill_rect(&rect);
                match self.textures.get(*asset) {
                    Some(texture) => match mode {
                        TextureMode::Tile => {
                            ctx.set_paint(image_paint(texture.image(), Extend::Repeat)?);
                            ctx.fill_rect(&rect);
                        }
                        TextureMode::Cover => paint_cover(ctx, transform, rect, texture.image())?,
                    },
                    None => tracing::debug!(asset, "texture not registered; using base color"),
                }
            }
            Fill::Image(image) => {
                ctx.set_paint(paint_color(fill.base_color(), 1.0));
                ctx.fill_rect(&rect);
                paint_cover(ctx, transform, rect, image.image())?;
            }
            Fill::Noise { base, opacity } => {
                ctx.set_paint(paint_color(*base, 1.0));
                ctx.fill_rect(&rect);
                ctx.set_paint(noise_paint(*opacity));
                ctx.fill_rect(&rect);
            }
        }
        Ok(())
    }
}

impl Rasterizer for CpuRasterizer {
    fn render(&self, scene: &SceneDescription, options: &RasterOptions) -> anyhow::Result<RgbaImage> {
        let scale = options.scale;
        if !(scale.is_finite() && scale > 0.0) {
            bail!("invalid raster scale {scale}");
        }
        let region = if options.include_wall {
            Rect::from_size(scene.viewport)
        } else {
            scene
                .composite_bounds()
                .context("scene has no framed composite to rasterize")?
        };

        let width = (region.width * scale).round();
        let height = (region.height * scale).round();
        if width < 1.0 || height < 1.0 {
            bail!("raster region {width}x{height} is empty");
        }
        let limit = f64::from(MAX_CANVAS_SIDE);
        if width > limit || height > limit {
            bail!("raster region {width}x{height} exceeds the {MAX_CANVAS_SIDE} px canvas limit");
        }
        let (width, height) = (width as u16, height as u16);

        let base = Affine::scale(scale) * Affine::translate((-region.x, -region.y));
        let mut ctx = RenderContext::new(width, height);
        for layer in &scene.layers {
            if layer.kind == LayerKind::Wall && !options.include_wall {
                continue;
            }
            self.paint_layer(&mut ctx, base, layer)?;
        }
        ctx.flush();

        let mut pixmap = Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| unpremultiply([px[0], px[1], px[2], px[3]]))
            .collect();
        RgbaImage::from_raw(u32::from(width), u32::from(height), data)
            .context("rendered pixmap has an unexpected length")
    }
}

/// Scale about the pivot, then translate; rotation is applied to the art only.
fn placement_affine(transform: &Transform2D) -> Affine {
    let pivot = Vec2::new(transform.pivot.x, transform.pivot.y);
    let translate = Vec2::new(transform.translate.x, transform.translate.y);
    Affine::translate(pivot + translate) * Affine::scale(transform.scale) * Affine::translate(-pivot)
}

fn paint_rect(rect: Rect) -> PaintRect {
    PaintRect::new(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height)
}

fn paint_color(color: Color, alpha: f64) -> PaintColor {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    PaintColor::from_rgba8(color.r, color.g, color.b, alpha)
}

/// CSS `linear-gradient` geometry: the gradient line passes through the box center and is
/// long enough for the corners to reach the first and last stop.
fn linear_gradient(gradient: &LinearGradient, rect: PaintRect) -> Gradient {
    let radians = gradient.angle_degrees.to_radians();
    let direction = Vec2::new(radians.sin(), -radians.cos());
    let half_length =
        ((rect.width() * direction.x).abs() + (rect.height() * direction.y).abs()) / 2.0;
    let center = rect.center();
    let stops: Vec<ColorStop> = gradient
        .stops
        .iter()
        .map(|stop| ColorStop::from((stop.offset as f32, paint_color(stop.color, 1.0))))
        .collect();
    Gradient {
        kind: GradientKind::Linear(LinearGradientPosition::new(
            center - direction * half_length,
            center + direction * half_length,
        )),
        extend: Extend::Pad,
        stops: stops.as_slice().into(),
        ..Gradient::default()
    }
}

/// CSS blur radius to gaussian standard deviation.
fn std_dev(blur: f64) -> f32 {
    (blur / 2.0) as f32
}

fn paint_drop_shadow(ctx: &mut RenderContext, rect: PaintRect, shadow: &Shadow) {
    let shifted = rect + Vec2::new(shadow.offset.x, shadow.offset.y);
    ctx.set_paint(paint_color(shadow.color.color, shadow.color.alpha));
    if shadow.blur > 0.0 {
        ctx.fill_blurred_rounded_rect(&shifted, 0.0, std_dev(shadow.blur));
    } else {
        ctx.fill_rect(&shifted);
    }
}

/// Shades the inside of `rect` from the edges of an offset hole, clipped to the box.
fn paint_inset_shadow(ctx: &mut RenderContext, rect: PaintRect, shadow: &Shadow) {
    let offset = Vec2::new(shadow.offset.x, shadow.offset.y);
    if shadow.blur <= 0.0 && offset == Vec2::ZERO {
        return;
    }
    let hole = rect + offset;
    let reach = shadow.blur * 1.5 + offset.x.abs().max(offset.y.abs()) + 1.0;
    let strips = [
        PaintRect::new(hole.x0 - reach, hole.y0 - reach, hole.x1 + reach, hole.y0),
        PaintRect::new(hole.x0 - reach, hole.y1, hole.x1 + reach, hole.y1 + reach),
        PaintRect::new(hole.x0 - reach, hole.y0, hole.x0, hole.y1),
        PaintRect::new(hole.x1, hole.y0, hole.x1 + reach, hole.y1),
    ];

    ctx.push_clip_layer(&rect.to_path(CLIP_TOLERANCE));
    ctx.set_paint(paint_color(shadow.color.color, shadow.color.alpha));
    for strip in &strips {
        if shadow.blur > 0.0 {
            ctx.fill_blurred_rounded_rect(strip, 0.0, std_dev(shadow.blur));
        } else {
            ctx.fill_rect(strip);
        }
    }
    ctx.pop_layer();
}

/// Scales the image to cover `rect`, cropping the overflow around the center.
fn paint_cover(
    ctx: &mut RenderContext,
    transform: Affine,
    rect: PaintRect,
    image: &DynamicImage,
) -> anyhow::Result<()> {
    let (width, height) = (f64::from(image.width()), f64::from(image.height()));
    if width <= 0.0 || height <= 0.0 || rect.area() <= 0.0 {
        return Ok(());
    }
    let k = (rect.width() / width).max(rect.height() / height);
    let origin = rect.center() - Vec2::new(width * k, height * k) / 2.0;

    ctx.push_clip_layer(&rect.to_path(CLIP_TOLERANCE));
    ctx.set_transform(transform * Affine::translate(origin.to_vec2()) * Affine::scale(k));
    ctx.set_paint(image_paint(image, Extend::Pad)?);
    ctx.fill_rect(&PaintRect::new(0.0, 0.0, width, height));
    ctx.set_transform(transform);
    ctx.pop_layer();
    Ok(())
}

/// Draws the artwork into `rect`, rotated about the rect center.
fn paint_art(
    ctx: &mut RenderContext,
    transform: Affine,
    rect: Rect,
    image: &DynamicImage,
    rotate_degrees: i32,
) -> anyhow::Result<()> {
    let (width, height) = (f64::from(image.width()), f64::from(image.height()));
    if width <= 0.0 || height <= 0.0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return Ok(());
    }
    let center = rect.center();
    let placed = transform
        * Affine::rotate_about(
            f64::from(rotate_degrees).to_radians(),
            PaintPoint::new(center.x, center.y),
        )
        * Affine::translate((rect.x, rect.y))
        * Affine::scale_non_uniform(rect.width / width, rect.height / height);

    ctx.set_transform(placed);
    ctx.set_paint(image_paint(image, Extend::Pad)?);
    ctx.fill_rect(&PaintRect::new(0.0, 0.0, width, height));
    ctx.set_transform(transform);
    Ok(())
}

fn image_paint(image: &DynamicImage, extend: Extend) -> anyhow::Result<vello_cpu::Image> {
    let rgba = image.to_rgba8();
    let width = u16::try_from(rgba.width()).context("image width exceeds u16")?;
    let height = u16::try_from(rgba.height()).context("image height exceeds u16")?;

    let mut may_have_opacities = false;
    let pixels = rgba
        .pixels()
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            premultiply(px.0)
        })
        .collect();
    Ok(pixmap_paint(
        Pixmap::from_parts_with_opacity(pixels, width, height, may_have_opacities),
        extend,
    ))
}

fn pixmap_paint(pixmap: Pixmap, extend: Extend) -> vello_cpu::Image {
    vello_cpu::Image {
        image: ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: ImageSampler {
            x_extend: extend,
            y_extend: extend,
            ..ImageSampler::default()
        },
    }
}

/// Repeating grain tile: light and dark specks at up to `opacity`.
fn noise_paint(opacity: f64) -> vello_cpu::Image {
    let side = u32::from(NOISE_TILE_SIDE);
    let pixels = (0..side * side)
        .map(|i| {
            let grain = noise(i % side, i / side);
            let tone = if grain >= 0.5 { 255 } else { 0 };
            let alpha = (opacity.clamp(0.0, 1.0) * grain * 255.0).round() as u8;
            premultiply([tone, tone, tone, alpha])
        })
        .collect();
    pixmap_paint(
        Pixmap::from_parts_with_opacity(pixels, NOISE_TILE_SIDE, NOISE_TILE_SIDE, true),
        Extend::Repeat,
    )
}

/// Deterministic grain in [0, 1).
fn noise(x: u32, y: u32) -> f64 {
    let mut n = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    f64::from(n >> 8) / f64::from(1u32 << 24)
}

fn premultiply([r, g, b, a]: [u8; 4]) -> PremulRgba8 {
    let af = u16::from(a) + 1;
    let premul = |c: u8| ((u16::from(c) * af) >> 8) as u8;
    PremulRgba8 {
        r: premul(r),
        g: premul(g),
        b: premul(b),
        a,
    }
}

fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let restore = |c: u8| ((f64::from(c) * 255.0 / f64::from(a)).round().min(255.0)) as u8;
    [restore(r), restore(g), restore(b), a]
}
