/*!
 * Tracks and segments carried over from a loaded document.
 *
 * Imported data is kept as raw JSON so that fields the model does not know
 * about survive a load/export cycle. Only what the editing operations need
 * (material ids, time ranges, render index) is parsed out and written back
 * on export.
 */

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DraftError;
use crate::materials::MediaMaterial;
use crate::time_util::TimeRange;
use crate::track::{TrackType, insert_sorted};

/// Handle to an imported track of a particular document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle(pub(crate) usize);

/// A segment of an imported track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedSegment {
    raw: Value,
    pub material_id: String,
    pub target_timerange: TimeRange,
    /// Present on media segments
    pub source_timerange: Option<TimeRange>,
}

impl ImportedSegment {
    pub fn from_json(raw: &Value) -> Result<Self, DraftError> {
        let target = raw
            .get("target_timerange")
            .ok_or_else(|| DraftError::InvalidTemplate("segment lacks 'target_timerange'".to_string()))?;
        let source = match raw.get("source_timerange") {
            Some(v) if !v.is_null() => Some(TimeRange::import_json(v)?),
            _ => None,
        };
        Ok(Self {
            material_id: raw.get("material_id").and_then(Value::as_str).unwrap_or_default().to_string(),
            target_timerange: TimeRange::import_json(target)?,
            source_timerange: source,
            raw: raw.clone(),
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn start(&self) -> i64 {
        self.target_timerange.start
    }

    pub fn end(&self) -> i64 {
        self.target_timerange.end()
    }

    pub fn duration(&self) -> i64 {
        self.target_timerange.duration
    }

    /// Material ids this segment depends on: the main material and every
    /// extra reference
    pub fn referenced_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if !self.material_id.is_empty() {
            ids.push(self.material_id.clone());
        }
        if let Some(refs) = self.raw.get("extra_material_refs").and_then(Value::as_array) {
            ids.extend(refs.iter().filter_map(Value::as_str).map(str::to_string));
        }
        ids
    }

    pub fn render_index(&self) -> Option<i32> {
        self.raw.get("render_index").and_then(Value::as_i64).map(|v| v as i32)
    }

    pub fn export_json(&self, render_index: Option<i32>) -> Value {
        let mut value = self.raw.clone();
        if let Value::Object(map) = &mut value {
            map.insert("material_id".to_string(), Value::from(self.material_id.clone()));
            map.insert("target_timerange".to_string(), self.target_timerange.export_json());
            if let Some(source) = &self.source_timerange {
                map.insert("source_timerange".to_string(), source.export_json());
            }
            if let Some(index) = render_index {
                map.insert("render_index".to_string(), Value::from(index));
            }
        }
        value
    }
}

/// How an imported track may be edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportedTrackKind {
    /// Exported as loaded
    Frozen,
    /// Video or audio; supports material replacement
    Media,
    /// Supports text replacement
    Text,
}

/// A track carried over from a loaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTrack {
    pub track_type: TrackType,
    pub name: String,
    pub track_id: String,
    pub render_index: i32,
    pub kind: ImportedTrackKind,
    raw: Value,
    segments: Vec<ImportedSegment>,
}

impl ImportedTrack {
    pub fn from_json(raw: &Value) -> Result<Self, DraftError> {
        let type_name = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DraftError::InvalidTemplate("track lacks 'type'".to_string()))?;
        let track_type = TrackType::from_name(type_name)?;

        let segments = raw
            .get("segments")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(ImportedSegment::from_json).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .unwrap_or_default();

        let render_index = segments
            .iter()
            .filter_map(ImportedSegment::render_index)
            .max()
            .unwrap_or_else(|| track_type.base_render_index());

        let kind = match track_type {
            TrackType::Video | TrackType::Audio => ImportedTrackKind::Media,
            TrackType::Text => ImportedTrackKind::Text,
            _ => ImportedTrackKind::Frozen,
        };

        Ok(Self {
            track_type,
            name: raw.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
            track_id: raw.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
            render_index,
            kind,
            raw: raw.clone(),
            segments,
        })
    }

    pub fn segments(&self) -> &[ImportedSegment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<ImportedSegment> {
        &mut self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_editable(&self) -> bool {
        self.kind != ImportedTrackKind::Frozen
    }

    pub fn end_time(&self) -> i64 {
        self.segments.iter().map(ImportedSegment::end).max().unwrap_or(0)
    }

    /// Whether `material` can back segments of this track
    pub fn check_material_type(&self, material: &MediaMaterial) -> bool {
        matches!(
            (self.track_type, material),
            (TrackType::Video, MediaMaterial::Video(_)) | (TrackType::Audio, MediaMaterial::Audio(_))
        )
    }

    /// Shift every segment by `offset`, flooring starts at zero. Returns how
    /// many segments ended up overlapping their predecessor because of the
    /// floor.
    pub fn shift(&mut self, offset: i64) -> usize {
        if offset == 0 {
            return 0;
        }
        for seg in &mut self.segments {
            seg.target_timerange.start = (seg.target_timerange.start + offset).max(0);
        }
        let collisions = self
            .segments
            .windows(2)
            .filter(|pair| pair[0].target_timerange.overlaps(&pair[1].target_timerange))
            .count();
        if collisions > 0 {
            warn!(
                "Shifting track '{}' by {} us clamped {} segment(s) onto their predecessor",
                self.name, offset, collisions
            );
        }
        collisions
    }

    /// Insert a new segment given in exported form
    pub fn add_segment_json(&mut self, raw: &Value) -> Result<(), DraftError> {
        let segment = ImportedSegment::from_json(raw)?;
        insert_sorted(&mut self.segments, segment, |s| s.target_timerange, &self.name)?;
        Ok(())
    }

    pub fn export_json(&self) -> Value {
        let stamp = if self.is_editable() { Some(self.render_index) } else { None };
        let mut value = self.raw.clone();
        if let Value::Object(map) = &mut value {
            map.insert("name".to_string(), Value::from(self.name.clone()));
            map.insert("id".to_string(), Value::from(self.track_id.clone()));
            let segments: Vec<Value> = self.segments.iter().map(|s| s.export_json(stamp)).collect();
            map.insert("segments".to_string(), Value::Array(segments));
        }
        value
    }
}

/// What to do when a replacement material is shorter than the segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkMode {
    /// Move the start later, keeping the end
    CutHead,
    /// Keep the start, end earlier
    #[default]
    CutTail,
    /// Keep the start and pull every later segment left by the difference
    CutTailAlign,
    /// Trim both ends evenly, keeping the center
    Shrink,
}

/// What to try when a replacement material is longer than the segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendMode {
    /// Start earlier, only if the previous segment leaves room
    ExtendHead,
    /// End later, only if the next segment leaves room
    ExtendTail,
    /// End later and push later segments right as needed
    PushTail,
    /// Keep the segment length and play only the head of the material
    #[default]
    CutMaterialTail,
}

macro_rules! mode_names {
    ($ty:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DraftError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)*
                    _ => Err(DraftError::InvalidParameter(format!(
                        "unknown {} '{}'",
                        stringify!($ty),
                        s
                    ))),
                }
            }
        }
    };
}

mode_names!(ShrinkMode {
    CutHead => "cut_head",
    CutTail => "cut_tail",
    CutTailAlign => "cut_tail_align",
    Shrink => "shrink",
});

mode_names!(ExtendMode {
    ExtendHead => "extend_head",
    ExtendTail => "extend_tail",
    PushTail => "push_tail",
    CutMaterialTail => "cut_material_tail",
});

// Stand-in for "no next segment"
const OPEN_END: i64 = 1_000_000_000_000_000;

/// Fit segment `index` to a new source range.
///
/// The segment's target duration becomes the (possibly adjusted) source
/// duration. Neighbouring segments move only under `CutTailAlign` and
/// `PushTail`. On error the slice is left untouched.
pub fn process_timerange(
    segments: &mut [ImportedSegment],
    index: usize,
    source: TimeRange,
    shrink: ShrinkMode,
    extend: &[ExtendMode],
) -> Result<(), DraftError> {
    let mut source = source;
    let current = segments[index].duration();
    let new_duration = source.duration;
    let delta = (new_duration - current).abs();

    if new_duration < current {
        match shrink {
            ShrinkMode::CutHead => segments[index].target_timerange.start += delta,
            ShrinkMode::CutTail => {}
            ShrinkMode::CutTailAlign => {
                for later in &mut segments[index + 1..] {
                    later.target_timerange.start -= delta;
                }
            }
            ShrinkMode::Shrink => segments[index].target_timerange.start += delta / 2,
        }
    } else if new_duration > current {
        let prev_end = if index == 0 { 0 } else { segments[index - 1].end() };
        let next_start = segments.get(index + 1).map(ImportedSegment::start).unwrap_or(OPEN_END);
        let seg_start = segments[index].start();
        let seg_end = segments[index].end();

        let applied = extend.iter().copied().find(|mode| match mode {
            ExtendMode::ExtendHead => seg_start - delta >= prev_end,
            ExtendMode::ExtendTail => seg_end + delta <= next_start,
            ExtendMode::PushTail | ExtendMode::CutMaterialTail => true,
        });

        match applied {
            Some(ExtendMode::ExtendHead) => segments[index].target_timerange.start -= delta,
            Some(ExtendMode::ExtendTail) => {}
            Some(ExtendMode::PushTail) => {
                let shift = (seg_end + delta - next_start).max(0);
                for later in &mut segments[index + 1..] {
                    later.target_timerange.start += shift;
                }
            }
            Some(ExtendMode::CutMaterialTail) => source.duration = current,
            None => {
                let tried: Vec<&str> = extend.iter().map(ExtendMode::as_str).collect();
                return Err(DraftError::ExtensionFailed {
                    target: new_duration,
                    tried: tried.join(", "),
                });
            }
        }
        debug!("Extended segment {} using {:?}", index, applied);
    }

    let seg = &mut segments[index];
    seg.target_timerange.duration = source.duration;
    seg.source_timerange = Some(source);
    Ok(())
}

/// Rescale a `[start, end)` character range from a text of `old_len`
/// characters to one of `new_len`, rounding up. An empty old text maps every
/// range onto the whole new text.
pub fn rescale_range(old_len: u64, new_len: u64, range: (u64, u64)) -> (u64, u64) {
    if old_len == 0 {
        return (0, new_len);
    }
    let scale = |pos: u64| (pos * new_len).div_ceil(old_len);
    (scale(range.0), scale(range.1))
}

/// Rescale every style range, dropping styles that collapse to nothing
pub fn rescale_styles(old_len: u64, new_len: u64, styles: Vec<Value>) -> Vec<Value> {
    styles
        .into_iter()
        .filter_map(|mut style| {
            let range = style.get("range").and_then(Value::as_array).and_then(|r| match r.as_slice() {
                [a, b] => Some((a.as_u64()?, b.as_u64()?)),
                _ => None,
            });
            if let Some(range) = range {
                let (start, end) = rescale_range(old_len, new_len, range);
                if start == end {
                    return None;
                }
                style["range"] = Value::from(vec![start, end]);
            }
            Some(style)
        })
        .collect()
}
