//! In-memory stand-ins for the overlay and viewer seams.

use std::collections::VecDeque;

use glam::Vec2;
use image::RgbImage;

use crate::color::Rgb;
use crate::overlay::{OverlaySurface, StrokeStyle};
use crate::projection::ScreenRect;
use crate::reference::ReferenceImage;
use crate::viewer::{Cursor, Orientation, SurfaceId, Viewer, ViewerEvent};

/// Records every stroke ever drawn; `is_clear` reflects the visible state.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub strokes: Vec<(Vec<Vec2>, StrokeStyle)>,
    pub clears: usize,
    pub size: Option<(u32, u32)>,
    visible: bool,
}

impl RecordingOverlay {
    pub fn is_clear(&self) -> bool {
        !self.visible
    }
}

impl OverlaySurface for RecordingOverlay {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
        self.visible = false;
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.visible = false;
    }

    fn stroke_closed_path(&mut self, points: &[Vec2], style: &StrokeStyle) {
        self.strokes.push((points.to_vec(), *style));
        self.visible = true;
    }
}

pub fn reference_image(pixels: RgbImage, generation: u64) -> ReferenceImage {
    ReferenceImage::new("test_ID.png", generation, pixels)
}

pub fn paint_rect(pixels: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb) {
    let right = (x + width).min(pixels.width());
    let bottom = (y + height).min(pixels.height());
    for py in y..bottom {
        for px in x..right {
            pixels.put_pixel(px, py, image::Rgb([color.r, color.g, color.b]));
        }
    }
}

/// Viewer that "loads" instantly. Completion is queued until the caller
/// polls, or held back entirely while `hold_events` is set.
#[derive(Debug)]
pub struct FakeViewer {
    pub orientation: Orientation,
    pub surface: (u32, u32),
    pub rect: ScreenRect,
    pub loads: Vec<(String, Orientation)>,
    pub cursor: Cursor,
    pub hold_events: bool,
    pub fail_loads: bool,
    current: Option<SurfaceId>,
    next_surface: u64,
    events: VecDeque<ViewerEvent>,
    held: VecDeque<ViewerEvent>,
}

impl FakeViewer {
    /// 90x90 surface at the viewport origin; with a 360x180 reference image
    /// one surface pixel covers one degree.
    pub fn new() -> Self {
        Self {
            orientation: Orientation::default(),
            surface: (90, 90),
            rect: ScreenRect::new(0.0, 0.0, 90.0, 90.0),
            loads: Vec::new(),
            cursor: Cursor::Default,
            hold_events: false,
            fail_loads: false,
            current: None,
            next_surface: 0,
            events: VecDeque::new(),
            held: VecDeque::new(),
        }
    }

    /// Delivers completions that were held back.
    pub fn release_events(&mut self) {
        self.hold_events = false;
        self.events.extend(self.held.drain(..));
    }
}

impl Viewer for FakeViewer {
    fn yaw(&self) -> f32 {
        self.orientation.yaw
    }

    fn pitch(&self) -> f32 {
        self.orientation.pitch
    }

    fn hfov(&self) -> f32 {
        self.orientation.hfov
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    fn bounds(&self) -> ScreenRect {
        self.rect
    }

    fn surface_id(&self) -> Option<SurfaceId> {
        self.current
    }

    fn load(&mut self, image_path: &str, orientation: Orientation) -> SurfaceId {
        self.next_surface += 1;
        let surface = SurfaceId(self.next_surface);
        self.current = Some(surface);
        self.orientation = orientation;
        self.loads.push((image_path.to_string(), orientation));
        let event = if self.fail_loads {
            ViewerEvent::Failed {
                surface,
                reason: format!("cannot open {image_path}"),
            }
        } else {
            ViewerEvent::Loaded { surface }
        };
        if self.hold_events {
            self.held.push_back(event);
        } else {
            self.events.push_back(event);
        }
        surface
    }

    fn destroy(&mut self) {
        self.current = None;
    }

    fn poll_event(&mut self) -> Option<ViewerEvent> {
        self.events.pop_front()
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}
