use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};
use pano_hotspot::RasterOverlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStats {
    pub width: u32,
    pub height: u32,
    pub painted_pixels: usize,
    /// Bounding box of painted pixels as `(min_x, min_y, max_x, max_y)`.
    pub painted_bounds: Option<(u32, u32, u32, u32)>,
}

pub fn dump_overlay_to_png(overlay: &RasterOverlay, destination: &Path) -> Result<OverlayStats> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    export_rgba_to_png(
        destination,
        overlay.width(),
        overlay.height(),
        &overlay.to_rgba8(),
    )?;
    Ok(compute_overlay_stats(overlay))
}

fn export_rgba_to_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    let expected_len = width as usize * height as usize * 4;
    ensure!(
        data.len() == expected_len,
        "overlay buffer holds {} bytes, expected {expected_len}",
        data.len()
    );
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let encoder = PngEncoder::new(file);
    encoder
        .write_image(data, width, height, ColorType::Rgba8)
        .with_context(|| format!("writing PNG to {}", path.display()))?;
    Ok(())
}

fn compute_overlay_stats(overlay: &RasterOverlay) -> OverlayStats {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..overlay.height() {
        for x in 0..overlay.width() {
            let painted = overlay.pixel(x, y).is_some_and(|px| px[3] > 0);
            if !painted {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
    }
    OverlayStats {
        width: overlay.width(),
        height: overlay.height(),
        painted_pixels: overlay.painted_pixels(),
        painted_bounds: bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use pano_hotspot::{OverlaySurface, StrokeStyle};
    use tempfile::tempdir;

    #[test]
    fn writes_overlay_png_and_reports_painted_area() {
        let mut overlay = RasterOverlay::new(40, 30).expect("overlay");
        overlay.stroke_closed_path(
            &[
                Vec2::new(10.0, 10.0),
                Vec2::new(20.0, 10.0),
                Vec2::new(20.0, 20.0),
            ],
            &StrokeStyle {
                color: [255, 255, 255, 255],
                glow: None,
                dash: None,
                ..StrokeStyle::default()
            },
        );
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("out").join("overlay.png");

        let stats = dump_overlay_to_png(&overlay, &path).expect("export");
        assert_eq!((stats.width, stats.height), (40, 30));
        assert!(stats.painted_pixels > 0);
        let (min_x, min_y, max_x, max_y) = stats.painted_bounds.expect("painted");
        assert!(min_x <= 10 && min_y <= 10 && max_x >= 20 && max_y >= 20);

        let decoded = image::open(&path).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (40, 30));
        assert!(decoded.get_pixel(15, 10)[3] >= 250);
    }

    #[test]
    fn empty_overlay_has_no_bounds() {
        let overlay = RasterOverlay::new(8, 8).expect("overlay");
        let temp = tempdir().expect("temp dir");
        let stats = dump_overlay_to_png(&overlay, &temp.path().join("empty.png")).expect("export");
        assert_eq!(stats.painted_pixels, 0);
        assert_eq!(stats.painted_bounds, None);
    }
}
