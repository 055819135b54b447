//! Mapping between pointer positions on the rendered viewer and pixels of an
//! equirectangular reference image.
//!
//! The viewer pans linearly: a pointer offset of `dx` surface pixels is
//! `dx / width * hfov` degrees of yaw, and likewise for pitch against the
//! vertical field of view. Absolute directions then land on the panorama grid
//! with yaw spanning `[-180, 180)` left to right and pitch `+90..-90` top to
//! bottom. Horizontal wrap at the seam is expected.

use glam::Vec2;

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub yaw: f32,
    pub pitch: f32,
    pub hfov: f32,
}

/// Absolute viewing direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub yaw: f32,
    pub pitch: f32,
}

/// Integer pixel position inside a reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

/// Wraps `yaw` into `[-180, 180)`.
pub fn normalize_yaw(yaw: f32) -> f32 {
    (yaw + 180.0).rem_euclid(360.0) - 180.0
}

/// Vertical field of view for a surface of `width` x `height` pixels.
pub fn vertical_fov(hfov: f32, width: f32, height: f32) -> f32 {
    if width <= 0.0 {
        return hfov;
    }
    let half = (hfov.to_radians() / 2.0).tan();
    (2.0 * (half * height / width).atan()).to_degrees()
}

/// Absolute direction to pixel in a `width` x `height` equirectangular image.
pub fn direction_to_pixel(direction: Direction, width: u32, height: u32) -> Option<PixelCoord> {
    if width == 0 || height == 0 {
        return None;
    }
    let yaw = normalize_yaw(direction.yaw);
    let x = (((yaw + 180.0) / 360.0) * width as f32).floor() as i64;
    let x = x.rem_euclid(width as i64) as u32;
    let y = (((90.0 - direction.pitch) / 180.0) * height as f32).floor();
    if !(0.0..height as f32).contains(&y) {
        return None;
    }
    Some(PixelCoord { x, y: y as u32 })
}

/// Direction through the center of `pixel`.
pub fn pixel_to_direction(pixel: PixelCoord, width: u32, height: u32) -> Direction {
    let yaw = (pixel.x as f32 + 0.5) / width.max(1) as f32 * 360.0 - 180.0;
    let pitch = 90.0 - (pixel.y as f32 + 0.5) / height.max(1) as f32 * 180.0;
    Direction { yaw, pitch }
}

/// Projection for one camera pose against one rendered surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionMapper {
    pose: CameraPose,
    bounds: ScreenRect,
    surface_width: f32,
    surface_height: f32,
    vfov: f32,
}

impl ProjectionMapper {
    /// `bounds` is where the surface sits in the viewport; `surface` is its
    /// backing pixel size, which may differ when the surface is scaled.
    pub fn new(pose: CameraPose, bounds: ScreenRect, surface: (u32, u32)) -> Self {
        let surface_width = surface.0 as f32;
        let surface_height = surface.1 as f32;
        Self {
            pose,
            bounds,
            surface_width,
            surface_height,
            vfov: vertical_fov(pose.hfov, surface_width, surface_height),
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    fn is_degenerate(&self) -> bool {
        self.bounds.width <= 0.0
            || self.bounds.height <= 0.0
            || self.surface_width <= 0.0
            || self.surface_height <= 0.0
    }

    pub fn viewport_to_surface(&self, point: Vec2) -> Option<Vec2> {
        if self.is_degenerate() || !self.bounds.contains(point) {
            return None;
        }
        Some(Vec2::new(
            (point.x - self.bounds.x) * self.surface_width / self.bounds.width,
            (point.y - self.bounds.y) * self.surface_height / self.bounds.height,
        ))
    }

    pub fn surface_to_direction(&self, surface: Vec2) -> Direction {
        let yaw = self.pose.yaw + (surface.x / self.surface_width - 0.5) * self.pose.hfov;
        let pitch = self.pose.pitch + (0.5 - surface.y / self.surface_height) * self.vfov;
        Direction {
            yaw: normalize_yaw(yaw),
            pitch,
        }
    }

    pub fn viewport_to_direction(&self, point: Vec2) -> Option<Direction> {
        self.viewport_to_surface(point)
            .map(|surface| self.surface_to_direction(surface))
    }

    /// Reference pixel under the pointer, or `None` when the pointer is off
    /// the surface or the direction falls outside the image.
    pub fn viewport_to_pixel(&self, point: Vec2, width: u32, height: u32) -> Option<PixelCoord> {
        let direction = self.viewport_to_direction(point)?;
        direction_to_pixel(direction, width, height)
    }

    /// Viewport position of `direction`, or `None` when it is out of view.
    pub fn direction_to_viewport(&self, direction: Direction) -> Option<Vec2> {
        if self.is_degenerate() || self.pose.hfov <= 0.0 || self.vfov <= 0.0 {
            return None;
        }
        let dyaw = normalize_yaw(direction.yaw - self.pose.yaw);
        let dpitch = direction.pitch - self.pose.pitch;
        let sx = (dyaw / self.pose.hfov + 0.5) * self.surface_width;
        let sy = (0.5 - dpitch / self.vfov) * self.surface_height;
        if !(0.0..self.surface_width).contains(&sx) || !(0.0..self.surface_height).contains(&sy) {
            return None;
        }
        Some(Vec2::new(
            self.bounds.x + sx * self.bounds.width / self.surface_width,
            self.bounds.y + sy * self.bounds.height / self.surface_height,
        ))
    }

    pub fn pixel_to_viewport(&self, pixel: PixelCoord, width: u32, height: u32) -> Option<Vec2> {
        self.direction_to_viewport(pixel_to_direction(pixel, width, height))
    }
}
