/*!
 * Built-in metadata catalog.
 *
 * The editing application identifies effects, filters, transitions,
 * animations, masks and fonts by resource ids. This module ships a small
 * named catalog of such entries; callers needing other resources can build
 * the metadata structs directly.
 */

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::DraftError;

/// A tunable effect parameter and its native value domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParam {
    pub name: String,
    pub default_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl EffectParam {
    pub fn new(name: &str, default_value: f64, min_value: f64, max_value: f64) -> Self {
        Self {
            name: name.to_string(),
            default_value,
            min_value,
            max_value,
        }
    }

    /// Map a user value in `[0, 100]` onto the parameter's native domain
    pub fn scale(&self, percent: f64) -> f64 {
        self.min_value + (self.max_value - self.min_value) * percent / 100.0
    }
}

/// Which family a video effect belongs to. Scene effects apply to the whole
/// frame, character effects follow detected faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Scene,
    Character,
}

impl EffectKind {
    pub fn export_type(&self) -> &'static str {
        match self {
            Self::Scene => "video_effect",
            Self::Character => "face_effect",
        }
    }
}

/// Metadata shared by effects, filters and audio effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectMeta {
    pub name: String,
    pub is_vip: bool,
    pub resource_id: String,
    pub effect_id: String,
    pub md5: String,
    #[serde(default)]
    pub params: Vec<EffectParam>,
}

/// A named video effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEffectType {
    pub kind: EffectKind,
    pub meta: EffectMeta,
}

/// Transition metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionMeta {
    pub name: String,
    pub resource_id: String,
    pub effect_id: String,
    pub md5: String,
    /// Default duration in micro-units
    pub default_duration: i64,
    /// Whether the transition overlaps the neighbouring segments
    pub is_overlap: bool,
}

/// When an animation plays relative to its segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Intro,
    Outro,
    Group,
}

impl AnimationKind {
    pub fn export_type(&self) -> &'static str {
        match self {
            Self::Intro => "in",
            Self::Outro => "out",
            Self::Group => "group",
        }
    }
}

/// What an animation can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationTarget {
    Video,
    Text,
}

/// Animation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationMeta {
    pub title: String,
    pub kind: AnimationKind,
    pub target: AnimationTarget,
    pub resource_id: String,
    pub effect_id: String,
    pub md5: String,
    /// Default duration in micro-units
    pub duration: i64,
}

/// Mask shape metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskMeta {
    pub name: String,
    pub resource_type: String,
    pub resource_id: String,
    pub effect_id: String,
    pub md5: String,
    /// Width / height ratio used when no explicit rectangle width is given
    pub default_aspect_ratio: f64,
}

/// Font metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMeta {
    pub name: String,
    pub resource_id: String,
}

fn effect(name: &str, resource_id: &str, effect_id: &str, params: Vec<EffectParam>) -> EffectMeta {
    EffectMeta {
        name: name.to_string(),
        is_vip: false,
        resource_id: resource_id.to_string(),
        effect_id: effect_id.to_string(),
        md5: String::new(),
        params,
    }
}

static VIDEO_EFFECTS: Lazy<Vec<VideoEffectType>> = Lazy::new(|| {
    let scene = |meta| VideoEffectType { kind: EffectKind::Scene, meta };
    let character = |meta| VideoEffectType { kind: EffectKind::Character, meta };
    vec![
        scene(effect("blur", "6949826640291353101", "1159527", vec![
            EffectParam::new("effects_adjust_blur", 0.5, 0.0, 1.0),
        ])),
        scene(effect("shake", "6999222617412817445", "1267218", vec![
            EffectParam::new("effects_adjust_speed", 0.333, 0.0, 1.0),
            EffectParam::new("effects_adjust_intensity", 0.5, 0.0, 1.0),
        ])),
        scene(effect("flash", "7012243596542906887", "1305519", vec![
            EffectParam::new("effects_adjust_intensity", 0.7, 0.0, 1.0),
        ])),
        scene(effect("film_grain", "6899746327023128077", "944883", vec![
            EffectParam::new("effects_adjust_noise", 0.4, 0.0, 1.0),
            EffectParam::new("effects_adjust_filter", 0.8, 0.0, 1.0),
        ])),
        scene(effect("starlight", "7064810425375216158", "1418270", vec![
            EffectParam::new("effects_adjust_size", 0.4, 0.0, 1.0),
            EffectParam::new("effects_adjust_speed", 0.5, 0.0, 1.0),
            EffectParam::new("effects_adjust_number", 0.6, 0.0, 1.0),
        ])),
        scene(effect("vhs", "6706773500067107340", "429346", Vec::new())),
        character(effect("halo", "7110206417913991694", "1662433", vec![
            EffectParam::new("effects_adjust_color", 0.5, 0.0, 1.0),
        ])),
        character(effect("heart_eyes", "7035587427040088590", "1381212", Vec::new())),
    ]
});

static FILTERS: Lazy<Vec<EffectMeta>> = Lazy::new(|| {
    vec![
        effect("clear", "7127832883823153678", "1744163", Vec::new()),
        effect("vintage", "6706773534229549582", "429374", Vec::new()),
        effect("warm", "7100465813591904782", "1621390", Vec::new()),
        effect("black_white", "6858152582066344456", "781349", Vec::new()),
        effect("cinematic", "7127829405310341645", "1744090", Vec::new()),
    ]
});

static AUDIO_EFFECTS: Lazy<Vec<EffectMeta>> = Lazy::new(|| {
    vec![
        effect("echo", "7021052476713685511", "1327563", vec![
            EffectParam::new("change_voice_param_quantity", 0.6, 0.0, 1.0),
            EffectParam::new("change_voice_param_strength", 0.4, 0.0, 1.0),
        ]),
        effect("robot", "7021052566446805512", "1327590", vec![
            EffectParam::new("change_voice_param_strength", 1.0, 0.0, 1.0),
        ]),
        effect("chipmunk", "7021052350440051208", "1327528", vec![
            EffectParam::new("change_voice_param_pitch", 0.5, 0.0, 1.0),
            EffectParam::new("change_voice_param_timbre", 0.5, 0.0, 1.0),
        ]),
    ]
});

static TRANSITIONS: Lazy<Vec<TransitionMeta>> = Lazy::new(|| {
    let transition = |name: &str, resource_id: &str, effect_id: &str, default_duration: i64, is_overlap: bool| {
        TransitionMeta {
            name: name.to_string(),
            resource_id: resource_id.to_string(),
            effect_id: effect_id.to_string(),
            md5: String::new(),
            default_duration,
            is_overlap,
        }
    };
    vec![
        transition("dissolve", "6724845717472416269", "322577", 466_666, true),
        transition("fade_to_black", "6724239388189921806", "319737", 466_666, false),
        transition("slide_left", "6724226861666144779", "319697", 500_000, true),
        transition("zoom_in", "6724846004274729485", "322583", 500_000, true),
    ]
});

static ANIMATIONS: Lazy<Vec<AnimationMeta>> = Lazy::new(|| {
    let animation = |title: &str, kind, target, resource_id: &str, effect_id: &str, duration: i64| AnimationMeta {
        title: title.to_string(),
        kind,
        target,
        resource_id: resource_id.to_string(),
        effect_id: effect_id.to_string(),
        md5: String::new(),
        duration,
    };
    use AnimationKind::*;
    use AnimationTarget::*;
    vec![
        animation("fade_in", Intro, Video, "6798320778182922760", "624705", 500_000),
        animation("zoom_in", Intro, Video, "6798332733694153230", "624755", 500_000),
        animation("fade_out", Outro, Video, "6798320902548230669", "624706", 500_000),
        animation("swing", Group, Video, "6800268825611735559", "636161", 1_000_000),
        animation("typewriter", Intro, Text, "7026654386064609806", "1349549", 500_000),
        animation("fade_in", Intro, Text, "6724916044072227332", "322646", 500_000),
        animation("fade_out", Outro, Text, "6724919382387954183", "322655", 500_000),
    ]
});

static MASKS: Lazy<Vec<MaskMeta>> = Lazy::new(|| {
    let mask = |name: &str, resource_type: &str, resource_id: &str, effect_id: &str, ratio: f64| MaskMeta {
        name: name.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
        effect_id: effect_id.to_string(),
        md5: String::new(),
        default_aspect_ratio: ratio,
    };
    vec![
        mask("linear", "line", "6791652175668843016", "636071", 1.0),
        mask("mirror", "mirror", "6791699060561549837", "636072", 1.0),
        mask("circle", "circle", "6791700663249654285", "636073", 1.0),
        mask("rectangle", "rectangle", "6791700809454703117", "636074", 1.0),
        mask("heart", "geometric_shape", "6794051276482023949", "636075", 1.115),
        mask("star", "geometric_shape", "6794051169434997255", "636076", 1.05),
    ]
});

static FONTS: Lazy<Vec<FontMeta>> = Lazy::new(|| {
    let font = |name: &str, resource_id: &str| FontMeta {
        name: name.to_string(),
        resource_id: resource_id.to_string(),
    };
    vec![
        font("system", "6740435892441190919"),
        font("wenxuan", "7290445778273702455"),
        font("serif_bold", "7244518590332801592"),
        font("handwriting", "7244518800744943165"),
        font("pixel", "7127797063612977677"),
    ]
});

fn lookup<T: Clone>(table: &[T], name: &str, label: &str, key: impl Fn(&T) -> &str) -> Result<T, DraftError> {
    table
        .iter()
        .find(|entry| key(entry) == name)
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = table.iter().map(&key).collect();
            DraftError::InvalidParameter(format!(
                "unknown {} '{}', expected one of: {}",
                label,
                name,
                known.join(", ")
            ))
        })
}

/// Look up a scene or character effect by name
pub fn video_effect(name: &str) -> Result<VideoEffectType, DraftError> {
    lookup(VIDEO_EFFECTS.as_slice(), name, "video effect", |e| e.meta.name.as_str())
}

/// Look up a filter by name
pub fn filter(name: &str) -> Result<EffectMeta, DraftError> {
    lookup(FILTERS.as_slice(), name, "filter", |e| e.name.as_str())
}

/// Look up an audio effect by name
pub fn audio_effect(name: &str) -> Result<EffectMeta, DraftError> {
    lookup(AUDIO_EFFECTS.as_slice(), name, "audio effect", |e| e.name.as_str())
}

/// Look up a transition by name
pub fn transition(name: &str) -> Result<TransitionMeta, DraftError> {
    lookup(TRANSITIONS.as_slice(), name, "transition", |e| e.name.as_str())
}

/// Look up an animation by target, kind and title
pub fn animation(target: AnimationTarget, kind: AnimationKind, title: &str) -> Result<AnimationMeta, DraftError> {
    let candidates: Vec<AnimationMeta> = ANIMATIONS
        .iter()
        .filter(|a| a.target == target && a.kind == kind)
        .cloned()
        .collect();
    lookup(candidates.as_slice(), title, "animation", |a| a.title.as_str())
}

/// Look up a mask shape by name
pub fn mask(name: &str) -> Result<MaskMeta, DraftError> {
    lookup(MASKS.as_slice(), name, "mask", |e| e.name.as_str())
}

/// Look up a font by name
pub fn font(name: &str) -> Result<FontMeta, DraftError> {
    lookup(FONTS.as_slice(), name, "font", |e| e.name.as_str())
}
