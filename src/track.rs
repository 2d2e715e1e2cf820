/*!
 * Tracks: typed, ordered, non-overlapping lists of segments.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::DraftError;
use crate::materials::new_id;
use crate::segments::{PlacedSegment, SegmentKind};
use crate::time_util::TimeRange;

/// Track types known to the editing application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Video,
    Audio,
    Effect,
    Filter,
    Sticker,
    Text,
    /// Adjustment layers; only ever imported
    Adjust,
}

impl TrackType {
    pub const ALL: [TrackType; 7] = [
        Self::Video,
        Self::Audio,
        Self::Effect,
        Self::Filter,
        Self::Sticker,
        Self::Text,
        Self::Adjust,
    ];

    /// Render index of the first track of this type
    pub fn base_render_index(&self) -> i32 {
        match self {
            Self::Video | Self::Audio | Self::Adjust => 0,
            Self::Effect => 10000,
            Self::Filter => 11000,
            Self::Sticker => 14000,
            Self::Text => 15000,
        }
    }

    /// Whether an imported track of this type can be edited
    pub fn allows_modify(&self) -> bool {
        matches!(self, Self::Video | Self::Audio | Self::Text)
    }

    pub fn accepted_kind(&self) -> Option<SegmentKind> {
        match self {
            Self::Video => Some(SegmentKind::Video),
            Self::Audio => Some(SegmentKind::Audio),
            Self::Effect => Some(SegmentKind::Effect),
            Self::Filter => Some(SegmentKind::Filter),
            Self::Sticker => Some(SegmentKind::Sticker),
            Self::Text => Some(SegmentKind::Text),
            Self::Adjust => None,
        }
    }

    pub fn accepts(&self, kind: SegmentKind) -> bool {
        self.accepted_kind() == Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Effect => "effect",
            Self::Filter => "filter",
            Self::Sticker => "sticker",
            Self::Text => "text",
            Self::Adjust => "adjust",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DraftError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| DraftError::InvalidTemplate(format!("unknown track type '{}'", name)))
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insert `item` keeping `items` sorted by start, rejecting overlaps
pub(crate) fn insert_sorted<T>(
    items: &mut Vec<T>,
    item: T,
    range_of: impl Fn(&T) -> TimeRange,
    track_name: &str,
) -> Result<usize, DraftError> {
    let range = range_of(&item);
    if items.iter().any(|existing| range_of(existing).overlaps(&range)) {
        return Err(DraftError::SegmentOverlap {
            track: track_name.to_string(),
            start: range.start,
            end: range.end(),
        });
    }
    let pos = items.partition_point(|existing| range_of(existing).start <= range.start);
    items.insert(pos, item);
    Ok(pos)
}

/// An authored track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_type: TrackType,
    pub name: String,
    pub track_id: String,
    pub render_index: i32,
    pub mute: bool,
    segments: Vec<PlacedSegment>,
}

impl Track {
    pub fn new(track_type: TrackType, name: impl Into<String>, render_index: i32, mute: bool) -> Self {
        Self {
            track_type,
            name: name.into(),
            track_id: new_id(),
            render_index,
            mute,
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[PlacedSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the last segment, 0 when empty
    pub fn end_time(&self) -> i64 {
        self.segments.iter().map(PlacedSegment::end).max().unwrap_or(0)
    }

    /// Check that `kind` may be placed at `range` without touching the track
    pub fn check_placement(&self, kind: SegmentKind, range: &TimeRange) -> Result<(), DraftError> {
        if !self.track_type.accepts(kind) {
            return Err(DraftError::TypeMismatch(format!(
                "{} segment cannot be added to {} track '{}'",
                kind.as_str(),
                self.track_type,
                self.name
            )));
        }
        if let Some(other) = self.segments.iter().find(|s| s.target_timerange.overlaps(range)) {
            debug!("Segment {} collides with {} on '{}'", range, other.target_timerange, self.name);
            return Err(DraftError::SegmentOverlap {
                track: self.name.clone(),
                start: range.start,
                end: range.end(),
            });
        }
        Ok(())
    }

    /// Insert a segment in start order
    pub fn add_segment(&mut self, segment: PlacedSegment) -> Result<(), DraftError> {
        self.check_placement(segment.kind, &segment.target_timerange)?;
        let pos = insert_sorted(&mut self.segments, segment, |s| s.target_timerange, &self.name)?;
        debug!("Placed segment at position {} on track '{}'", pos, self.name);
        Ok(())
    }

    pub fn export_json(&self) -> Value {
        let segments: Vec<Value> = self.segments.iter().map(|s| s.export_json(self.render_index)).collect();
        json!({
            "attribute": i32::from(self.mute),
            "flag": 0,
            "id": self.track_id,
            "is_default_name": self.name.is_empty(),
            "name": self.name,
            "segments": segments,
            "type": self.track_type.as_str(),
        })
    }
}
