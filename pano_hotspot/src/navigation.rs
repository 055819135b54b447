//! Current room plus furniture selection, and the asset paths derived from
//! them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{RoomDescriptor, SceneCatalog};
use crate::error::CatalogError;

/// Snapshot of the paths derived for one navigation revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub revision: u64,
    pub visible: String,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct NavigationState {
    catalog: Arc<SceneCatalog>,
    current_room: usize,
    selection: BTreeMap<String, String>,
    revision: u64,
    paths: AssetPaths,
}

impl NavigationState {
    /// Starts in the first catalog room with every slot on its default.
    pub fn new(catalog: Arc<SceneCatalog>) -> Result<Self, CatalogError> {
        if catalog.rooms().is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut selection = BTreeMap::new();
        for name in catalog.slot_names() {
            if let Some(default) = catalog.slot_default(name) {
                selection.insert(name.to_string(), default.to_string());
            }
        }
        let mut state = Self {
            catalog,
            current_room: 0,
            selection,
            revision: 0,
            paths: AssetPaths {
                revision: 0,
                visible: String::new(),
                reference: String::new(),
            },
        };
        state.paths = state.derive_paths();
        Ok(state)
    }

    pub fn catalog(&self) -> &Arc<SceneCatalog> {
        &self.catalog
    }

    pub fn current_room(&self) -> &RoomDescriptor {
        &self.catalog.rooms()[self.current_room]
    }

    pub fn current_room_id(&self) -> &str {
        &self.current_room().id
    }

    pub fn furniture_variant(&self, slot: &str) -> Option<&str> {
        self.selection.get(slot).map(String::as_str)
    }

    pub fn furniture_selection(&self) -> &BTreeMap<String, String> {
        &self.selection
    }

    /// Bumped by every mutation that changed the state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the current room declares `slot`.
    pub fn supports_slot(&self, slot: &str) -> bool {
        self.current_room().slot(slot).is_some()
    }

    /// Unknown ids are ignored. Returns whether the state changed.
    pub fn switch_room(&mut self, room_id: &str) -> bool {
        let Some(index) = self.catalog.rooms().iter().position(|r| r.id == room_id) else {
            log::warn!("ignoring switch to unknown room '{room_id}'");
            return false;
        };

        let before = (self.current_room, self.selection.clone());
        self.current_room = index;
        self.normalize_selection();
        if (self.current_room, &self.selection) == (before.0, &before.1) {
            return false;
        }
        log::info!("entered room '{}'", room_id);
        self.touch();
        true
    }

    /// Moves to the next room in catalog order, wrapping around.
    pub fn next_room(&mut self) -> bool {
        let Some(next) = self
            .catalog
            .next_room_after(self.current_room_id())
            .map(|room| room.id.clone())
        else {
            return false;
        };
        self.switch_room(&next)
    }

    /// Selects `variant` for `slot` when the current room offers it.
    pub fn set_furniture_variant(&mut self, slot: &str, variant: &str) -> bool {
        let Some(descriptor) = self.current_room().slot(slot) else {
            log::warn!(
                "room '{}' has no furniture slot '{slot}'",
                self.current_room_id()
            );
            return false;
        };
        if !descriptor.has_variant(variant) {
            log::warn!("slot '{slot}' has no variant '{variant}'");
            return false;
        }
        if self.furniture_variant(slot) == Some(variant) {
            return false;
        }
        self.selection.insert(slot.to_string(), variant.to_string());
        self.touch();
        true
    }

    /// Advances `slot` to its next variant, wrapping. Returns the new variant,
    /// or `None` when the current room has no such slot.
    pub fn cycle_furniture_variant(&mut self, slot: &str) -> Option<String> {
        let descriptor = self.current_room().slot(slot)?;
        let current = self.furniture_variant(slot).unwrap_or_default();
        let next = descriptor.variant_after(current)?.to_string();
        if self.furniture_variant(slot) != Some(next.as_str()) {
            self.selection.insert(slot.to_string(), next.clone());
            self.touch();
        }
        log::info!("slot '{slot}' now shows variant '{next}'");
        Some(next)
    }

    pub fn asset_paths(&self) -> &AssetPaths {
        &self.paths
    }

    pub fn current_visible_asset_path(&self) -> &str {
        &self.paths.visible
    }

    pub fn current_reference_asset_path(&self) -> &str {
        &self.paths.reference
    }

    fn normalize_selection(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let room = &catalog.rooms()[self.current_room];
        for name in catalog.slot_names() {
            let default = catalog.slot_default(name).unwrap_or_default();
            let keep = room.slot(name).and_then(|slot| {
                self.selection
                    .get(name)
                    .filter(|current| slot.has_variant(current))
                    .cloned()
            });
            let value = match keep {
                Some(current) if room.has_swappable_furniture() => current,
                _ => default.to_string(),
            };
            self.selection.insert(name.to_string(), value);
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.paths = self.derive_paths();
    }

    fn derive_paths(&self) -> AssetPaths {
        let (visible, reference) = self
            .catalog
            .asset_paths_for(self.current_room(), &self.selection);
        AssetPaths {
            revision: self.revision,
            visible,
            reference,
        }
    }
}
