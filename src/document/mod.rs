/*!
 * The draft document.
 *
 * A [`Document`] owns its authored tracks, the material registry and
 * whatever was carried over from a loaded template. Every mutation either
 * applies fully or leaves the document unchanged, and [`Document::export`]
 * renders the canonical JSON the editing application reads.
 */

mod replace;
mod subtitles;

pub use replace::{ImportTrackOptions, InspectedMaterial, MaterialInspection};
pub use subtitles::SubtitleImportOptions;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::app_config::{AppFlavor, Config};
use crate::errors::DraftError;
use crate::materials::catalog::{EffectMeta, VideoEffectType};
use crate::materials::MaterialRegistry;
use crate::segments::{EffectSegment, FilterSegment, Segment, SegmentKind};
use crate::template::ImportedTrack;
use crate::time_util::TimeRange;
use crate::track::{Track, TrackType};

// @const: Envelope fields every new document starts from
static ENVELOPE: Lazy<Map<String, Value>> = Lazy::new(|| {
    serde_json::from_str(include_str!("draft_template.json")).unwrap()
});

// @const: Platform block stamped on every export
static PLATFORM: Lazy<Value> = Lazy::new(|| {
    json!({
        "app_id": 359289,
        "app_source": "cc",
        "app_version": "6.5.0",
        "device_id": "c4ca4238a0b923820dcc509a6f75849b",
        "hard_disk_id": "307563e0192a94465c0e927fbc482942",
        "mac_address": "c3371f2d4fb02791c067ce44d8fb4ed5",
        "os": "mac",
        "os_version": "15.5",
    })
});

/// Options for [`Document::add_track`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackOptions {
    pub mute: bool,
    /// Offset from the type's base render index
    pub relative_index: i32,
    /// Render index used as is; takes precedence over `relative_index`
    pub absolute_index: Option<i32>,
}

impl TrackOptions {
    pub fn relative(relative_index: i32) -> Self {
        Self {
            relative_index,
            ..Self::default()
        }
    }
}

/// Where a segment lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackSlot {
    Authored(usize),
    Imported(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub flavor: AppFlavor,
    save_path: Option<PathBuf>,
    content: Map<String, Value>,
    materials: MaterialRegistry,
    tracks: Vec<Track>,
    #[serde(skip)]
    track_names: HashMap<String, usize>,
    #[serde(skip)]
    tracks_by_type: HashMap<TrackType, Vec<usize>>,
    imported_materials: Map<String, Value>,
    imported_tracks: Vec<ImportedTrack>,
}

impl Document {
    /// Create an empty document
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            flavor: AppFlavor::default(),
            save_path: None,
            content: ENVELOPE.clone(),
            materials: MaterialRegistry::new(),
            tracks: Vec::new(),
            track_names: HashMap::new(),
            tracks_by_type: HashMap::new(),
            imported_materials: Map::new(),
            imported_tracks: Vec::new(),
        }
    }

    /// Create an empty document using the configured canvas and flavor
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.canvas.width, config.canvas.height, config.canvas.fps).with_flavor(config.flavor)
    }

    pub fn with_flavor(mut self, flavor: AppFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Load a previously exported document and remember its path for
    /// [`Document::save`]
    pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Self, DraftError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut document = Self::from_json_str(&text)?;
        document.save_path = Some(path.to_path_buf());
        info!(
            "Loaded template {} with {} track(s)",
            path.display(),
            document.imported_tracks.len()
        );
        Ok(document)
    }

    /// Parse a previously exported document. All of its materials and tracks
    /// become imported data; identifiers are kept as they are.
    pub fn from_json_str(text: &str) -> Result<Self, DraftError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(content) = value else {
            return Err(DraftError::InvalidTemplate("document root is not an object".to_string()));
        };

        let canvas = content
            .get("canvas_config")
            .ok_or_else(|| DraftError::InvalidTemplate("missing 'canvas_config'".to_string()))?;
        let dimension = |key: &str| -> Result<u32, DraftError> {
            canvas
                .get(key)
                .and_then(Value::as_u64)
                .map(|v| v as u32)
                .ok_or_else(|| DraftError::InvalidTemplate(format!("canvas_config lacks '{}'", key)))
        };
        let (width, height) = (dimension("width")?, dimension("height")?);
        let fps = content.get("fps").and_then(Value::as_f64).map(|f| f.round() as u32).unwrap_or(30);

        let imported_materials = match content.get("materials") {
            Some(Value::Object(map)) => map.clone(),
            _ => return Err(DraftError::InvalidTemplate("missing 'materials' object".to_string())),
        };
        let imported_tracks = match content.get("tracks") {
            Some(Value::Array(list)) => list.iter().map(ImportedTrack::from_json).collect::<Result<Vec<_>, _>>()?,
            _ => return Err(DraftError::InvalidTemplate("missing 'tracks' array".to_string())),
        };

        let mut document = Self::new(width, height, fps);
        document.content = content;
        document.imported_materials = imported_materials;
        document.imported_tracks = imported_tracks;
        Ok(document)
    }

    /// Serialize the whole model, including state that is not part of the
    /// export, for caching
    pub fn to_bytes(&self) -> Result<Vec<u8>, DraftError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DraftError> {
        let mut document: Self = serde_json::from_slice(bytes)?;
        document.reindex();
        Ok(document)
    }

    fn reindex(&mut self) {
        self.track_names.clear();
        self.tracks_by_type.clear();
        for (i, track) in self.tracks.iter().enumerate() {
            self.track_names.insert(track.name.clone(), i);
            self.tracks_by_type.entry(track.track_type).or_default().push(i);
        }
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn imported_tracks(&self) -> &[ImportedTrack] {
        &self.imported_tracks
    }

    /// Raw imported materials, keyed by category
    pub fn imported_materials(&self) -> &Map<String, Value> {
        &self.imported_materials
    }

    /// End of the last segment across authored and imported tracks
    pub fn duration(&self) -> i64 {
        let authored = self.tracks.iter().map(Track::end_time);
        let imported = self.imported_tracks.iter().map(ImportedTrack::end_time);
        authored.chain(imported).max().unwrap_or(0)
    }

    fn has_track_named(&self, name: &str) -> bool {
        self.track_names.contains_key(name) || self.imported_tracks.iter().any(|t| t.name == name)
    }

    /// Add a track. A track without a name takes its type's name and is only
    /// allowed as the first of its type. Adding a name that already exists
    /// does nothing.
    pub fn add_track(&mut self, track_type: TrackType, name: Option<&str>, options: TrackOptions) -> Result<&mut Self, DraftError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                if self.tracks_by_type.get(&track_type).is_some_and(|list| !list.is_empty()) {
                    return Err(DraftError::DuplicateTrackType(track_type.to_string()));
                }
                track_type.as_str().to_string()
            }
        };
        if self.has_track_named(&name) {
            warn!("Track '{}' already exists, leaving it unchanged", name);
            return Ok(self);
        }

        let render_index = match options.absolute_index {
            Some(absolute) => {
                if options.relative_index != 0 {
                    warn!(
                        "Track '{}' given both absolute_index {} and relative_index {}, using absolute",
                        name, absolute, options.relative_index
                    );
                }
                absolute
            }
            None => track_type.base_render_index() + options.relative_index,
        };

        debug!("Adding {} track '{}' at render index {}", track_type, name, render_index);
        let index = self.tracks.len();
        self.tracks.push(Track::new(track_type, name.clone(), render_index, options.mute));
        self.track_names.insert(name, index);
        self.tracks_by_type.entry(track_type).or_default().push(index);
        Ok(self)
    }

    /// Resolve an authored track by name, or as the only track accepting
    /// `kind`
    pub fn get_track(&self, kind: SegmentKind, name: Option<&str>) -> Result<&Track, DraftError> {
        if let Some(name) = name {
            return self
                .track_names
                .get(name)
                .map(|&i| &self.tracks[i])
                .ok_or_else(|| DraftError::TrackNotFound(format!("no track named '{}'", name)));
        }

        let mut matching = self
            .tracks_by_type
            .iter()
            .filter(|(track_type, _)| track_type.accepts(kind))
            .flat_map(|(_, list)| list.iter().copied());
        match (matching.next(), matching.next()) {
            (None, _) => Err(DraftError::TrackNotFound(format!("no track accepts {} segments", kind.as_str()))),
            (Some(_), Some(_)) => Err(DraftError::AmbiguousTrack(format!(
                "several tracks accept {} segments, name one",
                kind.as_str()
            ))),
            (Some(i), None) => Ok(&self.tracks[i]),
        }
    }

    /// Find where a segment of `kind` goes, looking at authored tracks and at
    /// editable imported tracks
    fn resolve_slot(&self, kind: SegmentKind, name: Option<&str>) -> Result<TrackSlot, DraftError> {
        let mut candidates: Vec<TrackSlot> = Vec::new();
        match name {
            Some(name) => {
                candidates.extend(self.track_names.get(name).map(|&i| TrackSlot::Authored(i)));
                candidates.extend(
                    self.imported_tracks
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.name == name)
                        .map(|(i, _)| TrackSlot::Imported(i)),
                );
            }
            None => {
                candidates.extend(
                    self.tracks
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.track_type.accepts(kind))
                        .map(|(i, _)| TrackSlot::Authored(i)),
                );
                candidates.extend(
                    self.imported_tracks
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.is_editable() && t.track_type.accepts(kind))
                        .map(|(i, _)| TrackSlot::Imported(i)),
                );
            }
        }

        let wanted = name.map(|n| format!("named '{}'", n)).unwrap_or_else(|| format!("accepting {} segments", kind.as_str()));
        match candidates.as_slice() {
            [] => Err(DraftError::TrackNotFound(format!("no track {}", wanted))),
            [slot] => Ok(*slot),
            _ => Err(DraftError::AmbiguousTrack(format!("several tracks {}", wanted))),
        }
    }

    /// Place a segment and register every material it references.
    ///
    /// Fails without touching the document when the track cannot be
    /// resolved, does not accept the segment, or already has a segment in
    /// the way.
    pub fn add_segment(&mut self, segment: impl Into<Segment>, track_name: Option<&str>) -> Result<&mut Self, DraftError> {
        let segment = segment.into();
        let kind = segment.kind();
        let slot = self.resolve_slot(kind, track_name)?;
        let (placed, materials) = segment.into_parts();

        match slot {
            TrackSlot::Authored(i) => self.tracks[i].add_segment(placed)?,
            TrackSlot::Imported(i) => {
                let track = &mut self.imported_tracks[i];
                if !track.is_editable() || !track.track_type.accepts(kind) {
                    return Err(DraftError::TypeMismatch(format!(
                        "{} segment cannot be added to imported {} track '{}'",
                        kind.as_str(),
                        track.track_type,
                        track.name
                    )));
                }
                let raw = placed.export_json(track.render_index);
                track.add_segment_json(&raw)?;
            }
        }

        for material in materials {
            self.materials.register(material);
        }
        Ok(self)
    }

    /// Add a video effect spanning `range` on an effect track.
    /// `params` are percentages in `[0, 100]`.
    pub fn add_effect(
        &mut self,
        effect: &VideoEffectType,
        range: TimeRange,
        track_name: Option<&str>,
        params: Option<&[Option<f64>]>,
    ) -> Result<&mut Self, DraftError> {
        let segment = EffectSegment::new(effect, range, params)?;
        self.add_segment(segment, track_name)
    }

    /// Add a filter spanning `range` on a filter track, `intensity` in
    /// `[0, 100]`
    pub fn add_filter(
        &mut self,
        filter: &EffectMeta,
        range: TimeRange,
        track_name: Option<&str>,
        intensity: f64,
    ) -> Result<&mut Self, DraftError> {
        let segment = FilterSegment::new(filter, range, intensity)?;
        self.add_segment(segment, track_name)
    }

    /// Render the canonical document
    pub fn export(&self) -> Value {
        let mut content = self.content.clone();
        content.insert("fps".to_string(), json!(self.fps));
        content.insert("duration".to_string(), json!(self.duration()));
        content.insert(
            "canvas_config".to_string(),
            json!({ "width": self.width, "height": self.height, "ratio": "original" }),
        );

        let mut materials = self.materials.export(self.flavor);
        for (category, imported) in &self.imported_materials {
            let imported_list = imported.as_array().cloned().unwrap_or_default();
            match materials.get_mut(category) {
                Some(Value::Array(list)) => list.extend(imported_list),
                _ => {
                    materials.insert(category.clone(), imported.clone());
                }
            }
        }
        content.insert("materials".to_string(), Value::Object(materials));
        content.insert("last_modified_platform".to_string(), PLATFORM.clone());
        content.insert("platform".to_string(), PLATFORM.clone());

        let mut tracks: Vec<(i32, Value)> = self
            .tracks
            .iter()
            .map(|t| (t.render_index, t.export_json()))
            .chain(self.imported_tracks.iter().map(|t| (t.render_index, t.export_json())))
            .collect();
        tracks.sort_by_key(|(render_index, _)| *render_index);
        content.insert(
            "tracks".to_string(),
            Value::Array(tracks.into_iter().map(|(_, track)| track).collect()),
        );

        Value::Object(content)
    }

    /// Export as pretty JSON with four-space indentation
    pub fn dumps(&self) -> Result<String, DraftError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.export().serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write the export to `path`, replacing it atomically
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<(), DraftError> {
        let path = path.as_ref();
        let text = self.dumps()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(text.as_bytes())?;
        file.persist(path).map_err(|e| DraftError::Io(e.error))?;
        debug!("Wrote draft to {}", path.display());
        Ok(())
    }

    /// Write back to the path the document was loaded from
    pub fn save(&self) -> Result<(), DraftError> {
        let path = self.save_path.as_ref().ok_or(DraftError::NoSavePath)?;
        self.dump(path)?;
        info!("Saved draft to {}", path.display());
        Ok(())
    }
}
