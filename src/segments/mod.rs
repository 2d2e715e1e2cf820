/*!
 * Segments placed on tracks.
 *
 * Segment builders ([`VideoSegment`], [`TextSegment`], ...) own the
 * decoration materials they were given. When a segment is added to a
 * document it is split into a [`PlacedSegment`], which keeps only material
 * identifiers, and the list of materials handed to the registry.
 */

mod effect;
mod media;
mod text;

pub use effect::{EffectSegment, FilterSegment, StickerSegment};
pub use media::{AudioSegment, MaskOptions, MediaOptions, VideoSegment};
pub use text::TextSegment;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::materials::Material;
use crate::time_util::TimeRange;

/// The kind of a segment, used for track acceptance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Video,
    Audio,
    Text,
    Sticker,
    Effect,
    Filter,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Sticker => "sticker",
            Self::Effect => "effect",
            Self::Filter => "filter",
        }
    }
}

/// Position, scale, rotation and opacity of a visual segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSettings {
    pub alpha: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Clockwise, in degrees
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal offset in half-canvas widths
    pub transform_x: f64,
    /// Vertical offset in half-canvas heights, positive is up
    pub transform_y: f64,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            flip_horizontal: false,
            flip_vertical: false,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            transform_x: 0.0,
            transform_y: 0.0,
        }
    }
}

impl ClipSettings {
    /// Default settings moved vertically
    pub fn at_y(transform_y: f64) -> Self {
        Self {
            transform_y,
            ..Self::default()
        }
    }

    pub fn export_json(&self) -> Value {
        json!({
            "alpha": self.alpha,
            "flip": { "horizontal": self.flip_horizontal, "vertical": self.flip_vertical },
            "rotation": self.rotation,
            "scale": { "x": self.scale_x, "y": self.scale_y },
            "transform": { "x": self.transform_x, "y": self.transform_y },
        })
    }
}

/// Playback settings carried by media segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    pub source_timerange: TimeRange,
    pub speed: f64,
    pub volume: f64,
}

/// A segment as stored on a track: identifiers and placement only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSegment {
    pub kind: SegmentKind,
    pub segment_id: String,
    pub material_id: String,
    pub target_timerange: TimeRange,
    pub playback: Option<Playback>,
    pub clip: Option<ClipSettings>,
    pub extra_material_refs: Vec<String>,
}

impl PlacedSegment {
    pub fn start(&self) -> i64 {
        self.target_timerange.start
    }

    pub fn end(&self) -> i64 {
        self.target_timerange.end()
    }

    /// Export with the owning track's render index stamped on
    pub fn export_json(&self, render_index: i32) -> Value {
        let (source, speed, volume) = match &self.playback {
            Some(p) => (p.source_timerange.export_json(), p.speed, p.volume),
            None => (Value::Null, 1.0, 1.0),
        };
        let visual = self.kind != SegmentKind::Audio;
        json!({
            "caption_info": null,
            "cartoon": false,
            "clip": self.clip.as_ref().map(ClipSettings::export_json),
            "common_keyframes": [],
            "enable_adjust": visual,
            "enable_color_correct_adjust": false,
            "enable_color_curves": true,
            "enable_color_match_adjust": false,
            "enable_color_wheels": true,
            "enable_lut": visual,
            "enable_smart_color_adjust": false,
            "extra_material_refs": self.extra_material_refs,
            "group_id": "",
            "hdr_settings": if self.kind == SegmentKind::Video { json!({ "intensity": 1.0, "mode": 1, "nits": 1000 }) } else { Value::Null },
            "id": self.segment_id,
            "intensifies_audio": false,
            "is_placeholder": false,
            "is_tone_modify": false,
            "keyframe_refs": [],
            "last_nonzero_volume": 1.0,
            "material_id": self.material_id,
            "render_index": render_index,
            "responsive_layout": {
                "enable": false,
                "horizontal_pos_layout": 0,
                "size_layout": 0,
                "target_follow": "",
                "vertical_pos_layout": 0,
            },
            "reverse": false,
            "source_timerange": source,
            "speed": speed,
            "target_timerange": self.target_timerange.export_json(),
            "template_id": "",
            "template_scene": "default",
            "track_attribute": 0,
            "track_render_index": 0,
            "uniform_scale": if visual { json!({ "on": true, "value": 1.0 }) } else { Value::Null },
            "visible": true,
            "volume": volume,
        })
    }
}

/// Any segment that can be added to a document
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Video(VideoSegment),
    Audio(AudioSegment),
    Text(TextSegment),
    Sticker(StickerSegment),
    Effect(EffectSegment),
    Filter(FilterSegment),
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Video(_) => SegmentKind::Video,
            Self::Audio(_) => SegmentKind::Audio,
            Self::Text(_) => SegmentKind::Text,
            Self::Sticker(_) => SegmentKind::Sticker,
            Self::Effect(_) => SegmentKind::Effect,
            Self::Filter(_) => SegmentKind::Filter,
        }
    }

    pub fn target_timerange(&self) -> TimeRange {
        match self {
            Self::Video(s) => s.target_timerange,
            Self::Audio(s) => s.target_timerange,
            Self::Text(s) => s.target_timerange,
            Self::Sticker(s) => s.target_timerange,
            Self::Effect(s) => s.target_timerange,
            Self::Filter(s) => s.target_timerange,
        }
    }

    /// Split into the stored form and the materials it references, main
    /// material first
    pub fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        match self {
            Self::Video(s) => s.into_parts(),
            Self::Audio(s) => s.into_parts(),
            Self::Text(s) => s.into_parts(),
            Self::Sticker(s) => s.into_parts(),
            Self::Effect(s) => s.into_parts(),
            Self::Filter(s) => s.into_parts(),
        }
    }
}

macro_rules! segment_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Segment {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

segment_from! {
    Video => VideoSegment,
    Audio => AudioSegment,
    Text => TextSegment,
    Sticker => StickerSegment,
    Effect => EffectSegment,
    Filter => FilterSegment,
}
