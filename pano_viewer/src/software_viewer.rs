//! Off-screen stand-in for the panorama renderer. It decodes each visible
//! image to make sure it exists and is readable, and keeps the camera state a
//! real renderer would own.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use pano_hotspot::{Cursor, FovLimits, Orientation, ScreenRect, SurfaceId, Viewer, ViewerEvent};

pub struct SoftwareViewer {
    root: PathBuf,
    surface: (u32, u32),
    bounds: ScreenRect,
    limits: FovLimits,
    orientation: Orientation,
    current: Option<SurfaceId>,
    next_surface: u64,
    panorama_size: Option<(u32, u32)>,
    cursor: Cursor,
    events: VecDeque<ViewerEvent>,
}

impl SoftwareViewer {
    pub fn new(root: &Path, surface: (u32, u32), bounds: ScreenRect, limits: FovLimits) -> Self {
        Self {
            root: root.to_path_buf(),
            surface,
            bounds,
            limits,
            orientation: Orientation::default(),
            current: None,
            next_surface: 0,
            panorama_size: None,
            cursor: Cursor::Default,
            events: VecDeque::new(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Pixel size of the decoded visible panorama, if the last load worked.
    pub fn panorama_size(&self) -> Option<(u32, u32)> {
        self.panorama_size
    }

    /// Moves the camera. Missing components keep their current value.
    pub fn set_camera(&mut self, yaw: Option<f32>, pitch: Option<f32>, hfov: Option<f32>) {
        if let Some(yaw) = yaw {
            self.orientation.yaw = pano_hotspot::projection::normalize_yaw(yaw);
        }
        if let Some(pitch) = pitch {
            self.orientation.pitch = pitch.clamp(-90.0, 90.0);
        }
        if let Some(hfov) = hfov {
            self.orientation.hfov = self.limits.clamp(hfov);
        }
    }

    fn resolve(&self, image_path: &str) -> PathBuf {
        let candidate = Path::new(image_path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

impl Viewer for SoftwareViewer {
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
        self.bounds
    }

    fn surface_id(&self) -> Option<SurfaceId> {
        self.current
    }

    fn load(&mut self, image_path: &str, orientation: Orientation) -> SurfaceId {
        self.next_surface += 1;
        let surface = SurfaceId(self.next_surface);
        self.current = Some(surface);
        self.orientation = Orientation {
            yaw: pano_hotspot::projection::normalize_yaw(orientation.yaw),
            pitch: orientation.pitch.clamp(-90.0, 90.0),
            hfov: self.limits.clamp(orientation.hfov),
        };

        let full = self.resolve(image_path);
        let event = match image::open(&full) {
            Ok(decoded) => {
                self.panorama_size = Some((decoded.width(), decoded.height()));
                log::info!(
                    "surface {} shows {} ({}x{})",
                    surface.0,
                    full.display(),
                    decoded.width(),
                    decoded.height()
                );
                ViewerEvent::Loaded { surface }
            }
            Err(err) => {
                self.panorama_size = None;
                ViewerEvent::Failed {
                    surface,
                    reason: format!("{}: {err}", full.display()),
                }
            }
        };
        self.events.push_back(event);
        surface
    }

    fn destroy(&mut self) {
        if let Some(surface) = self.current.take() {
            log::debug!("destroyed surface {}", surface.0);
        }
        self.panorama_size = None;
    }

    fn poll_event(&mut self) -> Option<ViewerEvent> {
        self.events.pop_front()
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}
