use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{HotspotColor, SceneCatalog};
use crate::color::{ReferenceColor, Rgb};
use crate::navigation::NavigationState;

/// Logical click target: either "go to this room" or "cycle this slot".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotKey {
    Room(String),
    Furniture(String),
}

impl HotspotKey {
    pub fn room(id: impl Into<String>) -> Self {
        HotspotKey::Room(id.into())
    }

    pub fn furniture(slot: impl Into<String>) -> Self {
        HotspotKey::Furniture(slot.into())
    }

    pub fn is_room(&self) -> bool {
        matches!(self, HotspotKey::Room(_))
    }
}

impl fmt::Display for HotspotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotspotKey::Room(id) => write!(f, "room:{id}"),
            HotspotKey::Furniture(slot) => write!(f, "furniture:{slot}"),
        }
    }
}

/// Decides which hotspot a sampled ID-image color stands for.
///
/// Entries are checked room keys first, then furniture keys, each group in
/// declaration order; the first entry whose [`ReferenceColor::matches`]
/// accepts the sample wins.
#[derive(Debug, Clone)]
pub struct HotspotClassifier {
    entries: Vec<HotspotColor>,
}

impl HotspotClassifier {
    pub fn new(catalog: &SceneCatalog) -> Self {
        let (mut entries, furniture): (Vec<_>, Vec<_>) = catalog
            .hotspots()
            .iter()
            .cloned()
            .partition(|entry| entry.key.is_room());
        entries.extend(furniture);
        Self { entries }
    }

    pub fn entries(&self) -> &[HotspotColor] {
        &self.entries
    }

    pub fn classify(&self, color: Rgb, navigation: &NavigationState) -> Option<HotspotKey> {
        if color.is_background() {
            return None;
        }
        let matched = self.entries.iter().find(|entry| {
            let in_context = match &entry.key {
                HotspotKey::Room(_) => true,
                HotspotKey::Furniture(slot) => navigation.supports_slot(slot),
            };
            in_context && entry.color.matches(color)
        });
        match matched {
            Some(entry) => {
                log::debug!(
                    "sample ({}, {}, {}) classified as {}",
                    color.r,
                    color.g,
                    color.b,
                    entry.key
                );
                Some(entry.key.clone())
            }
            None => None,
        }
    }

    fn entry(&self, key: &HotspotKey) -> Option<&HotspotColor> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    pub fn reference_color(&self, key: &HotspotKey) -> Option<ReferenceColor> {
        self.entry(key).map(|entry| entry.color)
    }

    pub fn label(&self, key: &HotspotKey) -> Option<&str> {
        self.entry(key).and_then(|entry| entry.label.as_deref())
    }

    pub fn highlight_color(&self, key: &HotspotKey) -> Option<[u8; 4]> {
        self.entry(key).and_then(|entry| entry.highlight)
    }
}
