//! Seam to the panorama renderer. The hotspot pipeline never draws the photo
//! itself; it only reads the camera, the surface geometry, and load
//! notifications through this trait.

use serde::{Deserialize, Serialize};

use crate::projection::{CameraPose, ProjectionMapper, ScreenRect};

/// Identity of one rendered surface. A new id is minted every time the viewer
/// is recreated, and pointer listeners are bound to a specific id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Initial camera for a (re)load, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default = "Orientation::default_hfov")]
    pub hfov: f32,
}

impl Orientation {
    fn default_hfov() -> f32 {
        90.0
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            hfov: Self::default_hfov(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    Loaded { surface: SurfaceId },
    Failed { surface: SurfaceId, reason: String },
}

impl ViewerEvent {
    pub fn surface(&self) -> SurfaceId {
        match self {
            ViewerEvent::Loaded { surface } | ViewerEvent::Failed { surface, .. } => *surface,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Interactive,
}

pub trait Viewer {
    fn yaw(&self) -> f32;
    fn pitch(&self) -> f32;
    fn hfov(&self) -> f32;
    /// Backing pixel size of the rendered surface.
    fn surface_size(&self) -> (u32, u32);
    /// Where the surface sits in viewport coordinates.
    fn bounds(&self) -> ScreenRect;
    /// Surface currently on screen, if any.
    fn surface_id(&self) -> Option<SurfaceId>;
    /// Replaces the panorama. Completion is reported through [`Viewer::poll_event`].
    fn load(&mut self, image_path: &str, orientation: Orientation) -> SurfaceId;
    fn destroy(&mut self);
    fn poll_event(&mut self) -> Option<ViewerEvent>;
    fn set_cursor(&mut self, cursor: Cursor);

    fn orientation(&self) -> Orientation {
        Orientation {
            yaw: self.yaw(),
            pitch: self.pitch(),
            hfov: self.hfov(),
        }
    }

    fn projection(&self) -> ProjectionMapper {
        ProjectionMapper::new(
            CameraPose {
                yaw: self.yaw(),
                pitch: self.pitch(),
                hfov: self.hfov(),
            },
            self.bounds(),
            self.surface_size(),
        )
    }
}
