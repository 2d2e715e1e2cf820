/*!
 * Effect-like materials: video and audio effects, filters, transitions,
 * animations, masks, speeds, canvases and stickers.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::catalog::{AnimationMeta, AnimationTarget, EffectKind, EffectMeta, MaskMeta, TransitionMeta, VideoEffectType};
use super::new_id;
use crate::errors::DraftError;

/// A resolved effect parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParamInstance {
    pub name: String,
    pub default_value: f64,
    pub value: f64,
}

impl EffectParamInstance {
    pub fn export_json(&self) -> Value {
        json!({
            "default_value": self.default_value,
            "name": self.name,
            "value": self.value,
        })
    }
}

/// Resolve user parameters against the declared parameter list.
///
/// User values are percentages in `[0, 100]`; missing or `None` entries fall
/// back to the declared default.
pub fn resolve_params(meta: &EffectMeta, params: Option<&[Option<f64>]>) -> Result<Vec<EffectParamInstance>, DraftError> {
    let given = params.unwrap_or(&[]);
    if given.len() > meta.params.len() {
        return Err(DraftError::InvalidParameter(format!(
            "'{}' takes {} parameter(s), got {}",
            meta.name,
            meta.params.len(),
            given.len()
        )));
    }

    meta.params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let value = match given.get(i).copied().flatten() {
                Some(percent) => {
                    if !(0.0..=100.0).contains(&percent) {
                        return Err(DraftError::InvalidParameter(format!(
                            "parameter '{}' of '{}' must be within [0, 100], got {}",
                            param.name, meta.name, percent
                        )));
                    }
                    param.scale(percent)
                }
                None => param.default_value,
            };
            Ok(EffectParamInstance {
                name: param.name.clone(),
                default_value: param.default_value,
                value,
            })
        })
        .collect()
}

/// A video effect, either attached to a video segment or placed on an
/// effect track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEffect {
    pub global_id: String,
    pub kind: EffectKind,
    pub name: String,
    pub resource_id: String,
    pub effect_id: String,
    pub adjust_params: Vec<EffectParamInstance>,
    /// 0 when attached to a segment, 2 when placed on an effect track
    pub apply_target_type: u8,
}

impl VideoEffect {
    pub fn new(effect_type: &VideoEffectType, params: Option<&[Option<f64>]>, apply_target_type: u8) -> Result<Self, DraftError> {
        Ok(Self {
            global_id: new_id(),
            kind: effect_type.kind,
            name: effect_type.meta.name.clone(),
            resource_id: effect_type.meta.resource_id.clone(),
            effect_id: effect_type.meta.effect_id.clone(),
            adjust_params: resolve_params(&effect_type.meta, params)?,
            apply_target_type,
        })
    }

    pub fn export_json(&self) -> Value {
        json!({
            "adjust_params": self.adjust_params.iter().map(EffectParamInstance::export_json).collect::<Vec<_>>(),
            "apply_target_type": self.apply_target_type,
            "apply_time_range": null,
            "category_id": "",
            "category_name": "",
            "common_keyframes": [],
            "disable_effect_faces": [],
            "effect_id": self.effect_id,
            "formula_id": "",
            "id": self.global_id,
            "name": self.name,
            "platform": "all",
            "render_index": 11000,
            "resource_id": self.resource_id,
            "source_platform": 0,
            "time_range": null,
            "track_render_index": 0,
            "type": self.kind.export_type(),
            "value": 1.0,
            "version": "",
        })
    }
}

/// A color filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub global_id: String,
    pub name: String,
    pub resource_id: String,
    pub effect_id: String,
    /// Strength in `[0, 1]`
    pub intensity: f64,
    pub apply_target_type: u8,
}

impl Filter {
    /// Build a filter; `intensity` is a percentage in `[0, 100]`
    pub fn new(meta: &EffectMeta, intensity: f64, apply_target_type: u8) -> Result<Self, DraftError> {
        if !(0.0..=100.0).contains(&intensity) {
            return Err(DraftError::InvalidParameter(format!(
                "filter '{}' intensity must be within [0, 100], got {}",
                meta.name, intensity
            )));
        }
        Ok(Self {
            global_id: new_id(),
            name: meta.name.clone(),
            resource_id: meta.resource_id.clone(),
            effect_id: meta.effect_id.clone(),
            intensity: intensity / 100.0,
            apply_target_type,
        })
    }

    pub fn export_json(&self) -> Value {
        json!({
            "adjust_params": [],
            "algorithm_artifact_path": "",
            "apply_target_type": self.apply_target_type,
            "bloom_params": null,
            "category_id": "",
            "category_name": "",
            "color_match_info": {
                "source_feature_path": "",
                "target_feature_path": "",
                "target_image_path": "",
            },
            "effect_id": self.effect_id,
            "enable_skin_tone_correction": false,
            "exclusion_group": [],
            "face_adjust_params": [],
            "formula_id": "",
            "id": self.global_id,
            "intensity_key": "",
            "multi_language_current": "",
            "name": self.name,
            "panel_id": "",
            "platform": "all",
            "resource_id": self.resource_id,
            "source_platform": 1,
            "sub_type": "none",
            "time_range": null,
            "type": "filter",
            "value": self.intensity,
            "version": "",
        })
    }
}

/// A transition played at the end of a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub global_id: String,
    pub name: String,
    pub resource_id: String,
    pub effect_id: String,
    pub duration: i64,
    pub is_overlap: bool,
}

impl Transition {
    pub fn new(meta: &TransitionMeta, duration: Option<i64>) -> Result<Self, DraftError> {
        let duration = duration.unwrap_or(meta.default_duration);
        if duration < 0 {
            return Err(DraftError::InvalidRange(format!(
                "transition '{}' duration must not be negative, got {}",
                meta.name, duration
            )));
        }
        Ok(Self {
            global_id: new_id(),
            name: meta.name.clone(),
            resource_id: meta.resource_id.clone(),
            effect_id: meta.effect_id.clone(),
            duration,
            is_overlap: meta.is_overlap,
        })
    }

    pub fn export_json(&self) -> Value {
        json!({
            "category_id": "",
            "category_name": "",
            "duration": self.duration,
            "effect_id": self.effect_id,
            "id": self.global_id,
            "is_overlap": self.is_overlap,
            "name": self.name,
            "platform": "all",
            "resource_id": self.resource_id,
            "type": "transition",
        })
    }
}

/// One animation placed within a segment, times relative to the segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub meta: AnimationMeta,
    pub start: i64,
    pub duration: i64,
}

impl Animation {
    pub fn export_json(&self) -> Value {
        let (panel, material_type) = match self.meta.target {
            AnimationTarget::Video => ("video", "video"),
            AnimationTarget::Text => ("", "sticker"),
        };
        json!({
            "anim_adjust_params": null,
            "platform": "all",
            "panel": panel,
            "material_type": material_type,
            "name": self.meta.title,
            "id": self.meta.effect_id,
            "type": self.meta.kind.export_type(),
            "resource_id": self.meta.resource_id,
            "start": self.start,
            "duration": self.duration,
        })
    }
}

/// The animation set of one segment. At most one intro and one outro, or a
/// single group animation on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnimations {
    pub animation_id: String,
    pub animations: Vec<Animation>,
}

impl Default for SegmentAnimations {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentAnimations {
    pub fn new() -> Self {
        Self {
            animation_id: new_id(),
            animations: Vec::new(),
        }
    }

    pub fn add(&mut self, animation: Animation) -> Result<(), DraftError> {
        use super::catalog::AnimationKind::*;
        let kind = animation.meta.kind;
        let conflict = self.animations.iter().any(|existing| {
            let other = existing.meta.kind;
            other == kind || (kind == Group) != (other == Group)
        });
        if conflict {
            return Err(DraftError::InvalidParameter(format!(
                "cannot add {} animation '{}' alongside existing animations",
                kind.export_type(),
                animation.meta.title
            )));
        }
        self.animations.push(animation);
        Ok(())
    }

    pub fn export_json(&self) -> Value {
        json!({
            "id": self.animation_id,
            "type": "sticker_animation",
            "multi_language_current": "none",
            "animations": self.animations.iter().map(Animation::export_json).collect::<Vec<_>>(),
        })
    }
}

/// A shape mask on a video segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub global_id: String,
    pub meta: MaskMeta,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub aspect_ratio: f64,
    pub rotation: f64,
    pub invert: bool,
    pub feather: f64,
    pub round_corner: f64,
}

impl Mask {
    pub fn export_json(&self) -> Value {
        json!({
            "config": {
                "aspectRatio": self.aspect_ratio,
                "centerX": self.center_x,
                "centerY": self.center_y,
                "feather": self.feather,
                "height": self.height,
                "invert": self.invert,
                "rotation": self.rotation,
                "roundCorner": self.round_corner,
                "width": self.width,
            },
            "category": "video",
            "category_id": "",
            "category_name": "",
            "id": self.global_id,
            "name": self.meta.name,
            "platform": "all",
            "position_info": "",
            "resource_type": self.meta.resource_type,
            "resource_id": self.meta.resource_id,
            "type": "mask",
        })
    }
}

/// How the canvas behind a segment is filled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Blur strength in `[0, 1]`
    Blur(f64),
    /// `#RRGGBB` color
    Color(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundFilling {
    pub global_id: String,
    pub fill: Fill,
}

impl BackgroundFilling {
    pub fn new(fill: Fill) -> Result<Self, DraftError> {
        if let Fill::Blur(amount) = fill {
            if !(0.0..=1.0).contains(&amount) {
                return Err(DraftError::InvalidParameter(format!(
                    "blur must be within [0, 1], got {}",
                    amount
                )));
            }
        }
        Ok(Self {
            global_id: new_id(),
            fill,
        })
    }

    pub fn export_json(&self) -> Value {
        let (kind, blur, color) = match &self.fill {
            Fill::Blur(amount) => ("canvas_blur", *amount, String::new()),
            Fill::Color(color) => ("canvas_color", 0.0, color.clone()),
        };
        json!({
            "id": self.global_id,
            "type": kind,
            "blur": blur,
            "color": color,
            "source_platform": 0,
        })
    }
}

/// Playback speed of a media segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub global_id: String,
    pub speed: f64,
}

impl Speed {
    pub fn new(speed: f64) -> Self {
        Self {
            global_id: new_id(),
            speed,
        }
    }

    pub fn export_json(&self) -> Value {
        json!({
            "curve_speed": null,
            "id": self.global_id,
            "mode": 0,
            "speed": self.speed,
            "type": "speed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFade {
    pub fade_id: String,
    pub in_duration: i64,
    pub out_duration: i64,
}

impl AudioFade {
    pub fn new(in_duration: i64, out_duration: i64) -> Result<Self, DraftError> {
        if in_duration < 0 || out_duration < 0 {
            return Err(DraftError::InvalidRange(format!(
                "fade durations must not be negative ({}, {})",
                in_duration, out_duration
            )));
        }
        Ok(Self {
            fade_id: new_id(),
            in_duration,
            out_duration,
        })
    }

    pub fn export_json(&self) -> Value {
        json!({
            "id": self.fade_id,
            "fade_in_duration": self.in_duration,
            "fade_out_duration": self.out_duration,
            "fade_type": 0,
            "type": "audio_fade",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEffect {
    pub effect_id: String,
    pub name: String,
    pub resource_id: String,
    pub audio_adjust_params: Vec<EffectParamInstance>,
}

impl AudioEffect {
    pub fn new(meta: &EffectMeta, params: Option<&[Option<f64>]>) -> Result<Self, DraftError> {
        Ok(Self {
            effect_id: new_id(),
            name: meta.name.clone(),
            resource_id: meta.resource_id.clone(),
            audio_adjust_params: resolve_params(meta, params)?,
        })
    }

    pub fn export_json(&self) -> Value {
        json!({
            "audio_adjust_params": self.audio_adjust_params.iter().map(EffectParamInstance::export_json).collect::<Vec<_>>(),
            "category_id": "sound_effect",
            "category_name": "sound_effect",
            "id": self.effect_id,
            "is_ugc": false,
            "name": self.name,
            "production_path": "",
            "resource_id": self.resource_id,
            "speaker_id": "",
            "sub_type": 1,
            "time_range": { "duration": 0, "start": 0 },
            "type": "audio_effect",
        })
    }
}

/// The material record behind a sticker segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerMaterial {
    pub material_id: String,
    pub resource_id: String,
}

impl StickerMaterial {
    pub fn export_json(&self) -> Value {
        json!({
            "id": self.material_id,
            "resource_id": self.resource_id,
            "sticker_id": self.resource_id,
            "source_platform": 1,
            "type": "sticker",
        })
    }
}
