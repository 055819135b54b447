//! Hover outlines traced from the ID image.
//!
//! The scan walks the whole equirectangular reference image at a coarse
//! stride and keeps samples that match the hotspot color while at least one
//! 4-neighbour on the same grid does not. Those boundary pixels live in panorama space, so a
//! scan is reused while the same hotspot stays hovered and only reprojected
//! when the camera moves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::classify::HotspotKey;
use crate::color::ReferenceColor;
use crate::overlay::{OverlaySurface, StrokeStyle};
use crate::projection::{PixelCoord, ProjectionMapper};
use crate::reference::ReferenceImage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourConfig {
    #[serde(default = "ContourConfig::default_stride")]
    pub stride: u32,
    #[serde(default = "ContourConfig::default_min_boundary_points")]
    pub min_boundary_points: usize,
    #[serde(default)]
    pub style: StrokeStyle,
}

impl ContourConfig {
    fn default_stride() -> u32 {
        2
    }

    fn default_min_boundary_points() -> usize {
        10
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            stride: Self::default_stride(),
            min_boundary_points: Self::default_min_boundary_points(),
            style: StrokeStyle::default(),
        }
    }
}

/// Boundary pixels of one hotspot region in one reference image.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryScan {
    pub key: HotspotKey,
    pub generation: u64,
    pub image_size: (u32, u32),
    pub points: Vec<PixelCoord>,
    pub style: StrokeStyle,
}

fn matches_at(image: &ReferenceImage, color: &ReferenceColor, x: u32, y: u32) -> bool {
    image
        .sample(x, y)
        .is_some_and(|sample| !sample.is_background() && color.matches(sample))
}

fn is_boundary(image: &ReferenceImage, color: &ReferenceColor, x: u32, y: u32, step: u32) -> bool {
    let (width, height) = image.dimensions();
    let step_x = step % width;
    let left = (x + width - step_x) % width;
    let right = (x + step_x) % width;
    if !matches_at(image, color, left, y) || !matches_at(image, color, right, y) {
        return true;
    }
    if y < step || !matches_at(image, color, x, y - step) {
        return true;
    }
    y + step >= height || !matches_at(image, color, x, y + step)
}

/// Boundary samples of the region painted with `color`.
pub fn extract_boundary(
    image: &ReferenceImage,
    color: &ReferenceColor,
    stride: u32,
) -> Vec<PixelCoord> {
    let stride = stride.max(1);
    let (width, height) = image.dimensions();
    let mut points = Vec::new();
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            if matches_at(image, color, x, y) && is_boundary(image, color, x, y, stride) {
                points.push(PixelCoord { x, y });
            }
        }
    }
    points
}

/// Projects boundary pixels into the viewport and orders them by angle
/// around their centroid. Off-screen pixels are dropped.
pub fn outline_in_view(scan: &BoundaryScan, mapper: &ProjectionMapper) -> Vec<Vec2> {
    let (width, height) = scan.image_size;
    let mut points: Vec<Vec2> = scan
        .points
        .iter()
        .filter_map(|pixel| mapper.pixel_to_viewport(*pixel, width, height))
        .collect();
    if points.is_empty() {
        return points;
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    points.sort_by(|a, b| {
        let angle_a = (a.y - centroid.y).atan2(a.x - centroid.x);
        let angle_b = (b.y - centroid.y).atan2(b.x - centroid.x);
        angle_a.total_cmp(&angle_b)
    });
    points
}

pub struct ContourHighlighter<O: OverlaySurface> {
    overlay: O,
    config: ContourConfig,
    scan: Option<BoundaryScan>,
}

impl<O: OverlaySurface> ContourHighlighter<O> {
    pub fn new(overlay: O, config: ContourConfig) -> Self {
        Self {
            overlay,
            config,
            scan: None,
        }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    pub fn current_key(&self) -> Option<&HotspotKey> {
        self.scan.as_ref().map(|scan| &scan.key)
    }

    pub fn scan(&self) -> Option<&BoundaryScan> {
        self.scan.as_ref()
    }

    /// Outlines `key` on the overlay. Returns whether anything was drawn.
    pub fn show(
        &mut self,
        key: &HotspotKey,
        color: &ReferenceColor,
        highlight: Option<[u8; 4]>,
        image: &ReferenceImage,
        mapper: &ProjectionMapper,
    ) -> bool {
        let reusable = self
            .scan
            .as_ref()
            .is_some_and(|scan| &scan.key == key && scan.generation == image.generation());
        if !reusable {
            self.hide();
            let points = extract_boundary(image, color, self.config.stride);
            if points.len() < self.config.min_boundary_points {
                log::debug!(
                    "{key}: {} boundary points, below minimum {}",
                    points.len(),
                    self.config.min_boundary_points
                );
                return false;
            }
            let style = match highlight {
                Some(rgba) => self.config.style.with_color(rgba),
                None => self.config.style,
            };
            log::debug!("{key}: traced {} boundary points", points.len());
            self.scan = Some(BoundaryScan {
                key: key.clone(),
                generation: image.generation(),
                image_size: image.dimensions(),
                points,
                style,
            });
        }
        self.update(mapper)
    }

    /// Redraws the current outline for a new camera pose.
    pub fn update(&mut self, mapper: &ProjectionMapper) -> bool {
        let Some(scan) = self.scan.as_ref() else {
            return false;
        };
        self.overlay.clear();
        let outline = outline_in_view(scan, mapper);
        if outline.len() < self.config.min_boundary_points {
            return false;
        }
        self.overlay.stroke_closed_path(&outline, &scan.style);
        true
    }

    pub fn hide(&mut self) {
        self.scan = None;
        self.overlay.clear();
    }
}
