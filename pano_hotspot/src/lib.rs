//! Color-coded hotspots for equirectangular room tours.
//!
//! Every visible panorama has a companion ID image in which each clickable
//! object is flat-filled with a reference color. Pointer positions on the
//! viewer are mapped onto that image, the sampled color is classified into a
//! [`HotspotKey`], and clicks drive room and furniture changes through
//! [`InteractionController`].

pub mod catalog;
pub mod classify;
pub mod color;
pub mod config;
pub mod contour;
pub mod error;
pub mod interaction;
pub mod navigation;
pub mod overlay;
pub mod projection;
pub mod reference;
pub mod viewer;

#[cfg(test)]
mod testing;

pub use catalog::{AssetNaming, FurnitureSlot, HotspotColor, RoomDescriptor, SceneCatalog};
pub use classify::{HotspotClassifier, HotspotKey};
pub use color::{ReferenceColor, Rgb};
pub use config::{FovLimits, InteractionConfig, TourConfig};
pub use contour::{BoundaryScan, ContourConfig, ContourHighlighter};
pub use error::{CatalogError, ConfigError, LoadError, OverlayError};
pub use interaction::{InteractionController, InteractionState, PointerOutcome, Throttle};
pub use navigation::{AssetPaths, NavigationState};
pub use overlay::{Glow, OverlaySurface, RasterOverlay, StrokeStyle};
pub use projection::{CameraPose, Direction, PixelCoord, ProjectionMapper, ScreenRect};
pub use reference::{
    FsFetcher, ImageFetcher, LoadOutcome, LoadStatus, MemoryFetcher, ReferenceImage,
    ReferenceImageStore,
};
pub use viewer::{Cursor, Orientation, SurfaceId, Viewer, ViewerEvent};
