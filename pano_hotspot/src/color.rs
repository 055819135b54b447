//! Reference colors painted into ID images and the tolerance rule used to
//! recognise them.
//!
//! A sample matches a reference color when the straight-line RGB distance is
//! at most `tolerance * sqrt(3)`. The tolerance is written per channel in the
//! configuration; multiplying by `sqrt(3)` turns it into the diagonal of the
//! per-channel cube so a sample that is off by `tolerance` on every channel
//! still matches.

use serde::{Deserialize, Serialize};

/// Plain 8-bit RGB triple sampled from an ID image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pure black marks pixels that belong to no hotspot.
    pub const BACKGROUND: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_background(self) -> bool {
        self == Self::BACKGROUND
    }

    /// Squared RGB distance, exact in integers.
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r.abs_diff(other.r) as u32;
        let dg = self.g.abs_diff(other.g) as u32;
        let db = self.b.abs_diff(other.b) as u32;
        dr * dr + dg * dg + db * db
    }

    pub fn distance(self, other: Rgb) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { r, g, b }
    }
}

pub const DEFAULT_TOLERANCE: f32 = 20.0;

fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}

/// Color a hotspot is flat-filled with in the ID image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

impl ReferenceColor {
    pub const fn new(r: u8, g: u8, b: u8, tolerance: f32) -> Self {
        Self { r, g, b, tolerance }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Largest RGB distance still accepted as this color.
    pub fn match_radius(&self) -> f32 {
        self.tolerance.max(0.0) * 3f32.sqrt()
    }

    /// `match_radius()` squared, computed without the rounding of `sqrt`.
    pub fn match_radius_squared(&self) -> f64 {
        let tolerance = f64::from(self.tolerance.max(0.0));
        3.0 * tolerance * tolerance
    }

    pub fn matches(&self, sample: Rgb) -> bool {
        f64::from(sample.distance_squared(self.rgb())) <= self.match_radius_squared()
    }

    /// True when no sample can match both colors.
    pub fn is_separable_from(&self, other: &ReferenceColor) -> bool {
        let reach = f64::from(self.tolerance.max(0.0)) + f64::from(other.tolerance.max(0.0));
        f64::from(self.rgb().distance_squared(other.rgb())) > 3.0 * reach * reach
    }
}
