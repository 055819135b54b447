//! Transparent surface drawn above the viewer for hover outlines.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use crate::error::OverlayError;

/// Soft halo drawn underneath the main stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    /// Extra radius beyond the stroke, in pixels.
    #[serde(default = "Glow::default_spread")]
    pub spread: f32,
    #[serde(default = "Glow::default_alpha")]
    pub alpha: u8,
}

impl Glow {
    fn default_spread() -> f32 {
        6.0
    }

    fn default_alpha() -> u8 {
        96
    }
}

impl Default for Glow {
    fn default() -> Self {
        Self {
            spread: Self::default_spread(),
            alpha: Self::default_alpha(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    #[serde(default = "StrokeStyle::default_color")]
    pub color: [u8; 4],
    #[serde(default = "StrokeStyle::default_width")]
    pub width: f32,
    #[serde(default = "StrokeStyle::default_glow")]
    pub glow: Option<Glow>,
    /// `[on, off]` lengths in pixels; `null` draws a solid line.
    #[serde(default = "StrokeStyle::default_dash")]
    pub dash: Option<[f32; 2]>,
}

impl StrokeStyle {
    fn default_color() -> [u8; 4] {
        [255, 255, 255, 204]
    }

    fn default_width() -> f32 {
        4.0
    }

    fn default_glow() -> Option<Glow> {
        Some(Glow::default())
    }

    fn default_dash() -> Option<[f32; 2]> {
        Some([8.0, 4.0])
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    fn paint(color: [u8; 4]) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        paint
    }

    fn stroke(&self, width: f32) -> Stroke {
        Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            dash: self
                .dash
                .and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0)),
            ..Stroke::default()
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Self::default_color(),
            width: Self::default_width(),
            glow: Self::default_glow(),
            dash: Self::default_dash(),
        }
    }
}

/// Drawing target for hover outlines, in viewport coordinates.
pub trait OverlaySurface {
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn stroke_closed_path(&mut self, points: &[Vec2], style: &StrokeStyle);
}

/// CPU overlay backed by a `tiny_skia` pixmap.
#[derive(Clone)]
pub struct RasterOverlay {
    pixmap: Pixmap,
    dirty: bool,
    visible: bool,
}

impl RasterOverlay {
    pub fn new(width: u32, height: u32) -> Result<Self, OverlayError> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            dirty: true,
            visible: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight (non-premultiplied) RGBA8 copy of the surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let px = px.demultiply();
                [px.red(), px.green(), px.blue(), px.alpha()]
            })
            .collect()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after presenting the buffer.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn painted_pixels(&self) -> usize {
        self.pixmap
            .pixels()
            .iter()
            .filter(|px| px.alpha() > 0)
            .count()
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap, OverlayError> {
    let width = width.max(1);
    let height = height.max(1);
    Pixmap::new(width, height).ok_or(OverlayError { width, height })
}

fn closed_path(points: &[Vec2]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in rest {
        builder.line_to(point.x, point.y);
    }
    builder.close();
    builder.finish()
}

impl OverlaySurface for RasterOverlay {
    fn resize(&mut self, width: u32, height: u32) {
        if self.width() == width.max(1) && self.height() == height.max(1) {
            return;
        }
        match allocate(width, height) {
            Ok(pixmap) => {
                self.pixmap = pixmap;
                self.visible = false;
                self.dirty = true;
            }
            Err(err) => log::warn!("keeping {}x{} overlay: {err}", self.width(), self.height()),
        }
    }

    fn clear(&mut self) {
        if !self.visible && self.painted_pixels() == 0 {
            return;
        }
        self.pixmap.fill(Color::TRANSPARENT);
        self.visible = false;
        self.dirty = true;
    }

    fn stroke_closed_path(&mut self, points: &[Vec2], style: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        let Some(path) = closed_path(points) else {
            return;
        };
        if let Some(glow) = style.glow {
            let mut halo = style.color;
            halo[3] = ((halo[3] as u16 * glow.alpha as u16) / 255) as u8;
            self.pixmap.stroke_path(
                &path,
                &StrokeStyle::paint(halo),
                &style.stroke(style.width + 2.0 * glow.spread),
                Transform::identity(),
                None,
            );
        }
        self.pixmap.stroke_path(
            &path,
            &StrokeStyle::paint(style.color),
            &style.stroke(style.width),
            Transform::identity(),
            None,
        );
        self.visible = true;
        self.dirty = true;
    }
}
