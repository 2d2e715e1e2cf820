/*!
 * Material registry.
 *
 * Each material is stored once, keyed by its identifier, in registration
 * order. Segments refer to materials by identifier only.
 */

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Material;
use crate::app_config::AppFlavor;

/// Every category key the exported `materials` object carries, in export
/// order. The mask key is appended per flavor.
pub const MATERIAL_KEYS: &[&str] = &[
    "ai_translates",
    "audio_balances",
    "audio_effects",
    "audio_fades",
    "audio_track_indexes",
    "audios",
    "beats",
    "canvases",
    "chromas",
    "color_curves",
    "digital_humans",
    "drafts",
    "effects",
    "flowers",
    "green_screens",
    "handwrites",
    "hsl",
    "images",
    "log_color_wheels",
    "loudnesses",
    "manual_deformations",
    "material_animations",
    "material_colors",
    "multi_language_refs",
    "placeholders",
    "plugin_effects",
    "primary_color_wheels",
    "realtime_denoises",
    "shapes",
    "smart_crops",
    "smart_relights",
    "sound_channel_mappings",
    "speeds",
    "stickers",
    "tail_leaders",
    "text_templates",
    "texts",
    "time_marks",
    "transitions",
    "video_effects",
    "video_trackings",
    "videos",
    "vocal_beautifys",
    "vocal_separations",
];

/// An empty `materials` object with every category present
pub fn empty_materials(flavor: AppFlavor) -> Map<String, Value> {
    let mut map = Map::new();
    for key in MATERIAL_KEYS.iter().copied().chain(std::iter::once(flavor.mask_key())) {
        map.insert(key.to_string(), Value::Array(Vec::new()));
    }
    map
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRegistry {
    entries: Vec<Material>,
    index: HashMap<String, usize>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and return its identifier.
    ///
    /// Registering a material whose identifier is already present leaves the
    /// registry untouched and returns the same identifier.
    pub fn register(&mut self, material: impl Into<Material>) -> String {
        let material = material.into();
        let id = material.id().to_string();
        if self.index.contains_key(&id) {
            return id;
        }
        debug!("Registering {:?} material {}", material.category(), id);
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(material);
        id
    }

    pub fn contains(&self, material: &Material) -> bool {
        self.contains_id(material.id())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materials in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.entries.iter()
    }

    /// Group every material under its schema category key
    pub fn export(&self, flavor: AppFlavor) -> Map<String, Value> {
        let mut map = empty_materials(flavor);
        for material in &self.entries {
            let key = material.category().export_key(flavor.mask_key());
            if let Some(Value::Array(list)) = map.get_mut(key) {
                list.push(material.export_json());
            }
        }
        map
    }
}
