//! Layered scene description produced from the configuration model.
//!
//! A scene is an ordered list of boxes, painted back to front:
//! - the wall, filling the viewport
//! - the frame, with its drop shadow and inner bevel
//! - the mat and the bevel cut along its inner edge (only when the mat is enabled)
//! - the artwork
//!
//! Scenes are rebuilt from scratch whenever an input changes and never mutated in place.

mod resolver;

pub use resolver::{CompositionResolver, DEFAULT_MAX_ART_FRACTION};

use crate::art::ImageHandle;
use crate::catalog::Fill;
use crate::geometry::{Insets, Point, Rect, Rgba, Size, Transform2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Wall,
    Frame,
    Mat,
    MatBevel,
    Art,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// Cast outside the box.
    Drop,
    /// Drawn inside the box along its edges.
    Inset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub kind: ShadowKind,
    pub offset: Point,
    pub blur: f64,
    pub color: Rgba,
}

impl Shadow {
    pub fn drop(offset: Point, blur: f64, alpha: f64) -> Self {
        Self {
            kind: ShadowKind::Drop,
            offset,
            blur,
            color: Rgba::black(alpha),
        }
    }

    pub fn inset(offset: Point, blur: f64, alpha: f64) -> Self {
        Self {
            kind: ShadowKind::Inset,
            offset,
            blur,
            color: Rgba::black(alpha),
        }
    }
}

/// What a layer paints inside its box.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Fill(Fill),
    Art(ImageHandle),
    /// Overlay that only carries shadows.
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Painted box in untransformed viewport coordinates (already inside `margin`).
    pub rect: Rect,
    pub padding: Insets,
    pub margin: Insets,
    pub content: LayerContent,
    pub shadows: Vec<Shadow>,
    pub transform: Transform2D,
}

impl Layer {
    /// Box after the layer transform, ignoring rotation.
    pub fn placed_rect(&self) -> Rect {
        self.transform.apply_rect(self.rect)
    }

    pub fn fill(&self) -> Option<&Fill> {
        match &self.content {
            LayerContent::Fill(fill) => Some(fill),
            LayerContent::Art(_) | LayerContent::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub viewport: Size,
    pub layers: Vec<Layer>,
}

impl SceneDescription {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|layer| layer.kind).collect()
    }

    pub fn has_art(&self) -> bool {
        self.layer(LayerKind::Art).is_some()
    }

    /// Natural and displayed width of the artwork, when both are known and non-zero.
    pub fn art_widths(&self) -> Option<(f64, f64)> {
        let layer = self.layer(LayerKind::Art)?;
        let LayerContent::Art(image) = &layer.content else {
            return None;
        };
        let natural = image.natural_size().width;
        let rendered = layer.rect.width;
        (natural > 0.0 && rendered > 0.0).then_some((natural, rendered))
    }

    /// Extent of the framed composite (frame box plus placement), if any art is framed.
    pub fn composite_bounds(&self) -> Option<Rect> {
        self.layer(LayerKind::Frame).map(Layer::placed_rect)
    }
}
