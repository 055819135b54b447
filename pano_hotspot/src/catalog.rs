//! Static description of the tour: rooms, their asset base paths, the
//! furniture slots that can be swapped, and the color each hotspot is painted
//! with in the ID images.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::HotspotKey;
use crate::color::{ReferenceColor, DEFAULT_TOLERANCE};
use crate::error::CatalogError;

/// One swappable piece of furniture inside a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FurnitureSlot {
    /// Stable key, e.g. `"sofa"`.
    pub name: String,
    /// Token appended after the variant code in asset names, e.g. `"-sofa"`.
    pub label_token: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Ordered variant codes. The first one is the default.
    pub variants: Vec<String>,
}

impl FurnitureSlot {
    pub fn default_variant(&self) -> Option<&str> {
        self.variants.first().map(String::as_str)
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|candidate| candidate == variant)
    }

    /// Variant listed after `current`, wrapping to the first. Unknown
    /// variants advance to the default.
    pub fn variant_after(&self, current: &str) -> Option<&str> {
        if self.variants.is_empty() {
            return None;
        }
        let next = match self.variants.iter().position(|v| v == current) {
            Some(idx) => (idx + 1) % self.variants.len(),
            None => 0,
        };
        self.variants.get(next).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub asset_base_path: String,
    #[serde(default)]
    pub furniture_slots: Vec<FurnitureSlot>,
}

impl RoomDescriptor {
    pub fn has_swappable_furniture(&self) -> bool {
        !self.furniture_slots.is_empty()
    }

    pub fn slot(&self, name: &str) -> Option<&FurnitureSlot> {
        self.furniture_slots.iter().find(|slot| slot.name == name)
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// File naming shared by every room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetNaming {
    #[serde(default = "AssetNaming::default_extension")]
    pub extension: String,
    #[serde(default = "AssetNaming::default_id_marker")]
    pub id_marker: String,
}

impl AssetNaming {
    fn default_extension() -> String {
        "jpg".to_string()
    }

    fn default_id_marker() -> String {
        "_ID".to_string()
    }
}

impl Default for AssetNaming {
    fn default() -> Self {
        Self {
            extension: Self::default_extension(),
            id_marker: Self::default_id_marker(),
        }
    }
}

/// Color table entry: which hotspot a reference color stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotColor {
    #[serde(flatten)]
    pub key: HotspotKey,
    pub color: ReferenceColor,
    /// Hover caption shown next to the pointer.
    #[serde(default)]
    pub label: Option<String>,
    /// RGBA stroke color for the hover outline. Falls back to the contour style.
    #[serde(default)]
    pub highlight: Option<[u8; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCatalog {
    rooms: Vec<RoomDescriptor>,
    #[serde(default)]
    naming: AssetNaming,
    hotspots: Vec<HotspotColor>,
}

impl SceneCatalog {
    /// Unvalidated; call [`SceneCatalog::validate`] before use.
    pub fn new(
        rooms: Vec<RoomDescriptor>,
        naming: AssetNaming,
        hotspots: Vec<HotspotColor>,
    ) -> Self {
        Self {
            rooms,
            naming,
            hotspots,
        }
    }

    /// Three-room demo tour: a furnished living room with sofa and coffee
    /// table variants, plus two bedrooms.
    pub fn builtin() -> Self {
        let abc = || vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let room = |id: &str, label: &str, slots: Vec<FurnitureSlot>| RoomDescriptor {
            id: id.to_string(),
            label: Some(label.to_string()),
            asset_base_path: id.to_string(),
            furniture_slots: slots,
        };
        // Outlines use the hotspot's own color at 80% opacity.
        let hotspot = |key: HotspotKey, rgb: [u8; 3], label: &str| HotspotColor {
            key,
            color: ReferenceColor::new(rgb[0], rgb[1], rgb[2], DEFAULT_TOLERANCE),
            label: Some(label.to_string()),
            highlight: Some([rgb[0], rgb[1], rgb[2], 204]),
        };

        Self {
            rooms: vec![
                room(
                    "living-room",
                    "Living room",
                    vec![
                        FurnitureSlot {
                            name: "sofa".to_string(),
                            label_token: "-sofa".to_string(),
                            display_name: Some("Sofa".to_string()),
                            variants: abc(),
                        },
                        FurnitureSlot {
                            name: "table".to_string(),
                            label_token: "-table".to_string(),
                            display_name: Some("Coffee table".to_string()),
                            variants: abc(),
                        },
                    ],
                ),
                room("master-bedroom", "Master bedroom", Vec::new()),
                room("guest-bedroom", "Guest bedroom", Vec::new()),
            ],
            naming: AssetNaming::default(),
            hotspots: vec![
                hotspot(
                    HotspotKey::room("living-room"),
                    [0, 255, 255],
                    "Go to the living room",
                ),
                hotspot(
                    HotspotKey::room("master-bedroom"),
                    [255, 255, 0],
                    "Go to the master bedroom",
                ),
                hotspot(
                    HotspotKey::room("guest-bedroom"),
                    [0, 0, 255],
                    "Go to the guest bedroom",
                ),
                hotspot(HotspotKey::furniture("sofa"), [0, 255, 0], "Swap the sofa"),
                hotspot(
                    HotspotKey::furniture("table"),
                    [255, 0, 0],
                    "Swap the coffee table",
                ),
            ],
        }
    }

    pub fn rooms(&self) -> &[RoomDescriptor] {
        &self.rooms
    }

    pub fn naming(&self) -> &AssetNaming {
        &self.naming
    }

    /// Color table in declaration order.
    pub fn hotspots(&self) -> &[HotspotColor] {
        &self.hotspots
    }

    #[cfg(test)]
    pub(crate) fn hotspots_mut(&mut self) -> &mut Vec<HotspotColor> {
        &mut self.hotspots
    }

    pub fn room(&self, id: &str) -> Option<&RoomDescriptor> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn first_room(&self) -> Option<&RoomDescriptor> {
        self.rooms.first()
    }

    pub fn next_room_after(&self, id: &str) -> Option<&RoomDescriptor> {
        if self.rooms.is_empty() {
            return None;
        }
        let next = match self.rooms.iter().position(|room| room.id == id) {
            Some(idx) => (idx + 1) % self.rooms.len(),
            None => 0,
        };
        self.rooms.get(next)
    }

    /// First declaration of `name` across all rooms.
    pub fn slot(&self, name: &str) -> Option<&FurnitureSlot> {
        self.rooms.iter().find_map(|room| room.slot(name))
    }

    pub fn slot_default(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(FurnitureSlot::default_variant)
    }

    /// Every distinct slot name in declaration order.
    pub fn slot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for slot in self.rooms.iter().flat_map(|room| &room.furniture_slots) {
            if !names.contains(&slot.name.as_str()) {
                names.push(&slot.name);
            }
        }
        names
    }

    /// Visible and ID image paths for `room` showing `selection`. Slots
    /// missing from `selection` use their default variant.
    pub fn asset_paths_for(
        &self,
        room: &RoomDescriptor,
        selection: &BTreeMap<String, String>,
    ) -> (String, String) {
        let mut stem = room.asset_base_path.clone();
        for slot in &room.furniture_slots {
            let variant = selection
                .get(&slot.name)
                .map(String::as_str)
                .or_else(|| slot.default_variant())
                .unwrap_or_default();
            stem.push('_');
            stem.push_str(variant);
            stem.push_str(&slot.label_token);
        }
        let extension = &self.naming.extension;
        (
            format!("{stem}.{extension}"),
            format!("{stem}{}.{extension}", self.naming.id_marker),
        )
    }

    /// Every furniture combination `room` can show.
    pub fn selections(&self, room: &RoomDescriptor) -> Vec<BTreeMap<String, String>> {
        let mut combos = vec![BTreeMap::new()];
        for slot in &room.furniture_slots {
            combos = combos
                .into_iter()
                .flat_map(|base| {
                    slot.variants.iter().map(move |variant| {
                        let mut next = base.clone();
                        next.insert(slot.name.clone(), variant.clone());
                        next
                    })
                })
                .collect();
        }
        combos
    }

    pub fn hotspot(&self, key: &HotspotKey) -> Option<&HotspotColor> {
        self.hotspots.iter().find(|entry| &entry.key == key)
    }

    /// Startup check. Returns the first problem found; rooms without a color
    /// entry are only logged since they can still be reached through the
    /// manual selectors.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.rooms.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (idx, room) in self.rooms.iter().enumerate() {
            if self.rooms[..idx].iter().any(|other| other.id == room.id) {
                return Err(CatalogError::DuplicateRoom(room.id.clone()));
            }
            for (slot_idx, slot) in room.furniture_slots.iter().enumerate() {
                if room.furniture_slots[..slot_idx]
                    .iter()
                    .any(|other| other.name == slot.name)
                {
                    return Err(CatalogError::DuplicateSlot {
                        room: room.id.clone(),
                        slot: slot.name.clone(),
                    });
                }
                if slot.variants.is_empty() {
                    return Err(CatalogError::EmptySlot {
                        room: room.id.clone(),
                        slot: slot.name.clone(),
                    });
                }
                for (variant_idx, variant) in slot.variants.iter().enumerate() {
                    if slot.variants[..variant_idx].contains(variant) {
                        return Err(CatalogError::DuplicateVariant {
                            slot: slot.name.clone(),
                            variant: variant.clone(),
                        });
                    }
                }
            }
        }

        for (idx, entry) in self.hotspots.iter().enumerate() {
            match &entry.key {
                HotspotKey::Room(id) if self.room(id).is_none() => {
                    return Err(CatalogError::UnknownRoom(id.clone()));
                }
                HotspotKey::Furniture(slot) if self.slot(slot).is_none() => {
                    return Err(CatalogError::UnknownSlot(slot.clone()));
                }
                _ => {}
            }
            if self.hotspots[..idx]
                .iter()
                .any(|other| other.key == entry.key)
            {
                return Err(CatalogError::DuplicateColor(entry.key.to_string()));
            }
        }

        for (idx, first) in self.hotspots.iter().enumerate() {
            for second in &self.hotspots[idx + 1..] {
                if !first.color.is_separable_from(&second.color) {
                    return Err(CatalogError::AmbiguousColors {
                        first: first.key.to_string(),
                        second: second.key.to_string(),
                        distance: first.color.rgb().distance(second.color.rgb()),
                        required: first.color.match_radius() + second.color.match_radius(),
                    });
                }
            }
        }

        for room in &self.rooms {
            if self.hotspot(&HotspotKey::room(&room.id)).is_none() {
                log::warn!(
                    "room '{}' has no reference color; it is only reachable from the selectors",
                    room.id
                );
            }
        }

        Ok(())
    }
}
