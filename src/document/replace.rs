//! Template-mode operations: picking imported tracks, importing them into
//! another document, and replacing their materials or text.

use std::collections::HashSet;
use std::fmt;

use log::{debug, info};
use serde_json::{Map, Value};

use super::Document;
use crate::errors::DraftError;
use crate::materials::{Material, MediaMaterial};
use crate::template::{ExtendMode, ImportedTrack, ImportedTrackKind, ShrinkMode, TrackHandle, process_timerange, rescale_styles};
use crate::time_util::TimeRange;
use crate::track::TrackType;

/// Options for [`Document::import_track`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTrackOptions {
    /// Shift applied to every segment; negative starts are floored at zero
    pub offset: i64,
    pub new_name: Option<String>,
    /// Offset from the type's base render index; keeps the source's render
    /// index when omitted
    pub relative_index: Option<i32>,
}

/// Metadata of one imported sticker or text decoration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedMaterial {
    pub resource_id: String,
    pub effect_id: Option<String>,
    pub name: String,
}

/// Decorations present in the imported materials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialInspection {
    pub stickers: Vec<InspectedMaterial>,
    pub bubbles: Vec<InspectedMaterial>,
    pub flower_texts: Vec<InspectedMaterial>,
}

impl fmt::Display for MaterialInspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stickers:")?;
        for m in &self.stickers {
            writeln!(f, "\tResource id: {} '{}'", m.resource_id, m.name)?;
        }
        writeln!(f, "Text bubbles:")?;
        for m in &self.bubbles {
            writeln!(
                f,
                "\tEffect id: {}, Resource id: {} '{}'",
                m.effect_id.as_deref().unwrap_or(""),
                m.resource_id,
                m.name
            )?;
        }
        writeln!(f, "Flower text effects:")?;
        for m in &self.flower_texts {
            writeln!(f, "\tResource id: {} '{}'", m.resource_id, m.name)?;
        }
        Ok(())
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn material_list<'a>(materials: &'a Map<String, Value>, category: &str) -> &'a [Value] {
    materials
        .get(category)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Replace the text of a text record's `content`, which is either a JSON
/// document embedded in a string, a JSON object, or plain text
fn rewrite_content(content: &Value, new_text: &str, recalc_style: bool) -> Result<Value, DraftError> {
    let rewrite = |mut object: Map<String, Value>| -> Map<String, Value> {
        if recalc_style {
            let old_len = object.get("text").and_then(Value::as_str).map_or(0, |t| t.chars().count());
            let styles = match object.remove("styles") {
                Some(Value::Array(styles)) => styles,
                _ => Vec::new(),
            };
            let rescaled = rescale_styles(old_len as u64, new_text.chars().count() as u64, styles);
            object.insert("styles".to_string(), Value::Array(rescaled));
        }
        object.insert("text".to_string(), Value::from(new_text));
        object
    };

    match content {
        Value::String(embedded) => match serde_json::from_str::<Value>(embedded) {
            Ok(Value::Object(object)) => Ok(Value::String(Value::Object(rewrite(object)).to_string())),
            _ => Ok(Value::from(new_text)),
        },
        Value::Object(object) => Ok(Value::Object(rewrite(object.clone()))),
        other => Err(DraftError::InvalidTemplate(format!("unexpected text content {}", other))),
    }
}

impl Document {
    /// Pick one imported track of `track_type`, optionally by name and/or by
    /// position among imported tracks of that type (0 is the bottom one)
    pub fn get_imported_track(
        &self,
        track_type: TrackType,
        name: Option<&str>,
        index: Option<usize>,
    ) -> Result<TrackHandle, DraftError> {
        let matches: Vec<usize> = self
            .imported_tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.track_type == track_type)
            .enumerate()
            .filter(|(pos, (_, t))| name.is_none_or(|n| t.name == n) && index.is_none_or(|i| i == *pos))
            .map(|(_, (i, _))| i)
            .collect();

        let describe = || format!("type={}, name={:?}, index={:?}", track_type, name, index);
        match matches.as_slice() {
            [] => Err(DraftError::TrackNotFound(describe())),
            [i] => Ok(TrackHandle(*i)),
            _ => Err(DraftError::AmbiguousTrack(describe())),
        }
    }

    /// The imported track behind a handle obtained from this document
    pub fn imported_track(&self, handle: TrackHandle) -> Result<&ImportedTrack, DraftError> {
        self.imported_tracks
            .get(handle.0)
            .ok_or_else(|| DraftError::TrackNotFound(format!("no imported track #{}", handle.0)))
    }

    fn imported_track_mut(&mut self, handle: TrackHandle) -> Result<&mut ImportedTrack, DraftError> {
        self.imported_tracks
            .get_mut(handle.0)
            .ok_or_else(|| DraftError::TrackNotFound(format!("no imported track #{}", handle.0)))
    }

    /// Copy an imported track of `source`, with every material its segments
    /// reference, into this document. Identifiers are preserved, so the same
    /// track should not be imported twice into one document.
    pub fn import_track(
        &mut self,
        source: &Document,
        handle: TrackHandle,
        options: ImportTrackOptions,
    ) -> Result<&mut Self, DraftError> {
        let track = source.imported_track(handle)?;

        let mut wanted: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for id in track.segments().iter().flat_map(|s| s.referenced_ids()) {
            if seen.insert(id.clone()) {
                wanted.push(id);
            }
        }

        let mut copied: Vec<(String, Value)> = Vec::new();
        for (category, list) in &source.imported_materials {
            for material in list.as_array().map(Vec::as_slice).unwrap_or_default() {
                let Some(id) = material.get("id").and_then(Value::as_str) else {
                    continue;
                };
                if seen.remove(id) {
                    copied.push((category.clone(), material.clone()));
                }
            }
        }
        if !seen.is_empty() {
            let missing: Vec<String> = wanted.into_iter().filter(|id| seen.contains(id)).collect();
            return Err(DraftError::MissingMaterial(missing));
        }

        let mut imported = track.clone();
        if let Some(name) = options.new_name {
            imported.name = name;
        }
        if let Some(relative) = options.relative_index {
            imported.render_index = imported.track_type.base_render_index() + relative;
        }
        imported.shift(options.offset);

        info!(
            "Importing {} track '{}' with {} segment(s) and {} material(s)",
            imported.track_type,
            imported.name,
            imported.len(),
            copied.len()
        );
        self.imported_tracks.push(imported);
        for (category, material) in copied {
            let entry = self
                .imported_materials
                .entry(category)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = entry {
                list.push(material);
            }
        }
        Ok(self)
    }

    /// Update the unique imported material named `name` of the same kind as
    /// `material`. Segments keep their ranges; the crop is only replaced
    /// when asked, and only for video.
    pub fn replace_material_by_name(
        &mut self,
        name: &str,
        material: &MediaMaterial,
        replace_crop: bool,
    ) -> Result<&mut Self, DraftError> {
        let (category, name_key) = match material {
            MediaMaterial::Video(_) => ("videos", "material_name"),
            MediaMaterial::Audio(_) => ("audios", "name"),
        };
        let list = self
            .imported_materials
            .get_mut(category)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DraftError::MaterialNotFound(format!("no {} material named '{}'", material.kind_name(), name)))?;

        let mut found = list.iter_mut().filter(|m| m.get(name_key).and_then(Value::as_str) == Some(name));
        let target = found
            .next()
            .ok_or_else(|| DraftError::MaterialNotFound(format!("no {} material named '{}'", material.kind_name(), name)))?;
        if found.next().is_some() {
            return Err(DraftError::AmbiguousMaterial(format!(
                "several {} materials named '{}'",
                material.kind_name(),
                name
            )));
        }

        match material {
            MediaMaterial::Video(video) => {
                target[name_key] = Value::from(video.material_name.clone());
                target["path"] = Value::from(video.path.clone());
                target["duration"] = Value::from(video.duration);
                target["width"] = Value::from(video.width);
                target["height"] = Value::from(video.height);
                target["material_type"] = Value::from(video.material_type.as_str());
                if replace_crop {
                    target["crop"] = video.crop_settings.export_json();
                }
            }
            MediaMaterial::Audio(audio) => {
                target[name_key] = Value::from(audio.material_name.clone());
                target["path"] = Value::from(audio.path.clone());
                target["duration"] = Value::from(audio.duration);
            }
        }
        debug!("Replaced {} material '{}'", material.kind_name(), name);
        Ok(self)
    }

    /// Point segment `index` of an imported media track at `material`.
    ///
    /// The source range defaults to the whole material, or to the current
    /// segment length for photos. A shorter material is handled by `shrink`;
    /// a longer one by the first of `extend` that applies.
    pub fn replace_material_by_seg(
        &mut self,
        handle: TrackHandle,
        index: usize,
        material: &MediaMaterial,
        source: Option<TimeRange>,
        shrink: ShrinkMode,
        extend: &[ExtendMode],
    ) -> Result<&mut Self, DraftError> {
        let track = self.imported_track(handle)?;
        if track.kind != ImportedTrackKind::Media {
            return Err(DraftError::TypeMismatch(format!(
                "{} track '{}' does not support material replacement",
                track.track_type, track.name
            )));
        }
        if index >= track.len() {
            return Err(DraftError::IndexOutOfRange { index, len: track.len() });
        }
        if !track.check_material_type(material) {
            return Err(DraftError::TypeMismatch(format!(
                "{} material cannot replace a segment of {} track '{}'",
                material.kind_name(),
                track.track_type,
                track.name
            )));
        }

        let source = match source {
            Some(range) => range,
            None => match material {
                MediaMaterial::Video(video) if video.is_photo() => TimeRange::new(0, track.segments()[index].duration())?,
                _ => TimeRange::new(0, material.duration())?,
            },
        };
        if source.start < 0 || source.end() > material.duration() {
            return Err(DraftError::InvalidRange(format!(
                "source range {} exceeds material duration {}",
                source,
                material.duration()
            )));
        }

        let mut segments = track.segments().to_vec();
        process_timerange(&mut segments, index, source, shrink, extend)?;
        segments[index].material_id = material.material_id().to_string();

        *self.imported_track_mut(handle)?.segments_mut() = segments;
        self.materials.register(Material::from(material.clone()));
        Ok(self)
    }

    /// Replace the text of segment `index` of an imported text track.
    ///
    /// A plain text record takes exactly one string; a text template takes
    /// at most as many strings as it has text slots, filled in order. With
    /// `recalc_style` every style range is rescaled to the new length.
    pub fn replace_text(
        &mut self,
        handle: TrackHandle,
        index: usize,
        texts: &[&str],
        recalc_style: bool,
    ) -> Result<&mut Self, DraftError> {
        let track = self.imported_track(handle)?;
        if track.kind != ImportedTrackKind::Text {
            return Err(DraftError::TypeMismatch(format!(
                "{} track '{}' does not support text replacement",
                track.track_type, track.name
            )));
        }
        if index >= track.len() {
            return Err(DraftError::IndexOutOfRange { index, len: track.len() });
        }
        let material_id = track.segments()[index].material_id.clone();

        let texts_list = material_list(&self.imported_materials, "texts");
        let position_of = |id: &str| texts_list.iter().position(|m| m.get("id").and_then(Value::as_str) == Some(id));

        // Compute every new content before writing any of them
        let mut updates: Vec<(usize, Value)> = Vec::new();
        if let Some(pos) = position_of(&material_id) {
            let [text] = texts else {
                return Err(DraftError::TextCountMismatch(format!(
                    "plain text segment takes exactly one text, got {}",
                    texts.len()
                )));
            };
            let content = texts_list[pos].get("content").cloned().unwrap_or(Value::Null);
            updates.push((pos, rewrite_content(&content, text, recalc_style)?));
        } else {
            let template = material_list(&self.imported_materials, "text_templates")
                .iter()
                .find(|t| t.get("id").and_then(Value::as_str) == Some(material_id.as_str()))
                .ok_or_else(|| DraftError::MaterialNotFound(format!("text material '{}'", material_id)))?;
            let slots: Vec<String> = template
                .get("text_info_resources")
                .and_then(Value::as_array)
                .map(|list| list.iter().map(|r| str_field(r, "text_material_id")).collect())
                .unwrap_or_default();
            if texts.len() > slots.len() {
                return Err(DraftError::TextCountMismatch(format!(
                    "text template '{}' has {} slot(s), got {} text(s)",
                    str_field(template, "name"),
                    slots.len(),
                    texts.len()
                )));
            }
            for (slot, text) in slots.iter().zip(texts) {
                let pos = position_of(slot)
                    .ok_or_else(|| DraftError::MaterialNotFound(format!("text template slot '{}'", slot)))?;
                let content = texts_list[pos].get("content").cloned().unwrap_or(Value::Null);
                updates.push((pos, rewrite_content(&content, text, recalc_style)?));
            }
        }

        if let Some(list) = self.imported_materials.get_mut("texts").and_then(Value::as_array_mut) {
            for (pos, content) in updates {
                list[pos]["content"] = content;
            }
        }
        debug!("Replaced text of segment {} ({})", index, material_id);
        Ok(self)
    }

    /// Stickers, text bubbles and flower-text effects found in the imported
    /// materials
    pub fn inspect_materials(&self) -> MaterialInspection {
        let describe = |m: &Value, with_effect: bool| InspectedMaterial {
            resource_id: str_field(m, "resource_id"),
            effect_id: with_effect.then(|| str_field(m, "effect_id")),
            name: str_field(m, "name"),
        };
        let effects = material_list(&self.imported_materials, "effects");
        let effect_type = |e: &Value| e.get("type").and_then(Value::as_str).unwrap_or_default().to_string();

        MaterialInspection {
            stickers: material_list(&self.imported_materials, "stickers")
                .iter()
                .map(|m| describe(m, false))
                .collect(),
            bubbles: effects
                .iter()
                .filter(|e| effect_type(e) == "text_shape")
                .map(|m| describe(m, true))
                .collect(),
            flower_texts: effects
                .iter()
                .filter(|e| effect_type(e) == "text_effect")
                .map(|m| describe(m, false))
                .collect(),
        }
    }
}
