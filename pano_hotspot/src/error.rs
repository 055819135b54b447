use std::path::PathBuf;

use thiserror::Error;

/// Problems found while validating a tour catalog at startup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("catalog defines no rooms")]
    Empty,
    #[error("duplicate room id '{0}'")]
    DuplicateRoom(String),
    #[error("room '{room}' declares slot '{slot}' more than once")]
    DuplicateSlot { room: String, slot: String },
    #[error("slot '{slot}' in room '{room}' has no variants")]
    EmptySlot { room: String, slot: String },
    #[error("slot '{slot}' lists variant '{variant}' more than once")]
    DuplicateVariant { slot: String, variant: String },
    #[error("color entry references unknown room '{0}'")]
    UnknownRoom(String),
    #[error("color entry references unknown furniture slot '{0}'")]
    UnknownSlot(String),
    #[error("hotspot '{0}' has more than one color entry")]
    DuplicateColor(String),
    #[error(
        "reference colors for '{first}' and '{second}' are {distance:.1} apart; need more than {required:.1}"
    )]
    AmbiguousColors {
        first: String,
        second: String,
        distance: f32,
        required: f32,
    },
}

/// Reasons a reference image could not be made available.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no image registered for {0}")]
    Missing(String),
    #[error("image {path} has no pixels")]
    EmptyImage { path: String },
    #[error("failed to start loader thread: {0}")]
    Spawn(std::io::Error),
    #[error("loader for generation {0} went away before reporting")]
    Disconnected(u64),
}

/// Failure to read a tour configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading tour config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing tour config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tour catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// The overlay pixel buffer could not be allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot allocate a {width}x{height} overlay surface")]
pub struct OverlayError {
    pub width: u32,
    pub height: u32,
}
