use crate::errors::DraftError;
use crate::materials::catalog::{EffectMeta, VideoEffectType};
use crate::materials::{Filter, Material, StickerMaterial, VideoEffect, new_id};
use crate::time_util::TimeRange;

use super::{ClipSettings, PlacedSegment, SegmentKind};

// Effect and filter segments sit on their own tracks and apply to
// everything beneath them.
const TRACK_APPLY_TARGET: u8 = 2;

/// A video effect spanning a range of an effect track
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSegment {
    pub segment_id: String,
    pub target_timerange: TimeRange,
    pub effect: VideoEffect,
}

impl EffectSegment {
    /// `params` are percentages in `[0, 100]`, `None` entries keep defaults
    pub fn new(effect_type: &VideoEffectType, target: TimeRange, params: Option<&[Option<f64>]>) -> Result<Self, DraftError> {
        Ok(Self {
            segment_id: new_id(),
            target_timerange: target,
            effect: VideoEffect::new(effect_type, params, TRACK_APPLY_TARGET)?,
        })
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Effect,
            segment_id: self.segment_id,
            material_id: self.effect.global_id.clone(),
            target_timerange: self.target_timerange,
            playback: None,
            clip: None,
            extra_material_refs: Vec::new(),
        };
        (placed, vec![self.effect.into()])
    }
}

/// A filter spanning a range of a filter track
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSegment {
    pub segment_id: String,
    pub target_timerange: TimeRange,
    pub filter: Filter,
}

impl FilterSegment {
    /// `intensity` is a percentage in `[0, 100]`
    pub fn new(meta: &EffectMeta, target: TimeRange, intensity: f64) -> Result<Self, DraftError> {
        Ok(Self {
            segment_id: new_id(),
            target_timerange: target,
            filter: Filter::new(meta, intensity, TRACK_APPLY_TARGET)?,
        })
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Filter,
            segment_id: self.segment_id,
            material_id: self.filter.global_id.clone(),
            target_timerange: self.target_timerange,
            playback: None,
            clip: None,
            extra_material_refs: Vec::new(),
        };
        (placed, vec![self.filter.into()])
    }
}

/// A sticker identified by its resource id
#[derive(Debug, Clone, PartialEq)]
pub struct StickerSegment {
    pub segment_id: String,
    pub target_timerange: TimeRange,
    pub material: StickerMaterial,
    pub clip_settings: ClipSettings,
}

impl StickerSegment {
    pub fn new(resource_id: impl Into<String>, target: TimeRange) -> Self {
        Self {
            segment_id: new_id(),
            target_timerange: target,
            material: StickerMaterial {
                material_id: new_id(),
                resource_id: resource_id.into(),
            },
            clip_settings: ClipSettings::default(),
        }
    }

    pub fn with_clip(mut self, clip: ClipSettings) -> Self {
        self.clip_settings = clip;
        self
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Sticker,
            segment_id: self.segment_id,
            material_id: self.material.material_id.clone(),
            target_timerange: self.target_timerange,
            playback: None,
            clip: Some(self.clip_settings),
            extra_material_refs: Vec::new(),
        };
        (placed, vec![self.material.into()])
    }
}
