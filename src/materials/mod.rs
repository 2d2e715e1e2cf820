/*!
 * Materials referenced by segments.
 *
 * A material is anything a segment points at by identifier: media assets,
 * effects, filters, transitions, animations, masks, speeds, canvases,
 * stickers and text records. Materials are owned by the
 * [`MaterialRegistry`]; segments only hold their identifiers.
 */

pub mod catalog;
pub mod effects;
pub mod media;
pub mod registry;
pub mod text;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use effects::{
    Animation, AudioEffect, AudioFade, BackgroundFilling, EffectParamInstance, Filter, Mask, SegmentAnimations, Speed,
    StickerMaterial, Transition, VideoEffect,
};
pub use media::{AudioMaterial, CropSettings, MediaMaterial, VideoKind, VideoMaterial};
pub use registry::MaterialRegistry;
pub use text::{TextBackground, TextBorder, TextBubble, TextEffect, TextMaterial, TextStyle};

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The export category a material is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialCategory {
    Videos,
    Audios,
    Speeds,
    Masks,
    Transitions,
    MaterialAnimations,
    VideoEffects,
    /// Filters, text bubbles and flower-text effects share this category
    Effects,
    Canvases,
    Stickers,
    Texts,
    AudioFades,
    AudioEffects,
}

impl MaterialCategory {
    /// The schema key under `materials`. Masks are keyed by flavor.
    pub fn export_key(&self, mask_key: &'static str) -> &'static str {
        match self {
            Self::Videos => "videos",
            Self::Audios => "audios",
            Self::Speeds => "speeds",
            Self::Masks => mask_key,
            Self::Transitions => "transitions",
            Self::MaterialAnimations => "material_animations",
            Self::VideoEffects => "video_effects",
            Self::Effects => "effects",
            Self::Canvases => "canvases",
            Self::Stickers => "stickers",
            Self::Texts => "texts",
            Self::AudioFades => "audio_fades",
            Self::AudioEffects => "audio_effects",
        }
    }
}

/// Any material the registry can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    Video(VideoMaterial),
    Audio(AudioMaterial),
    VideoEffect(VideoEffect),
    Filter(Filter),
    TextBubble(TextBubble),
    TextEffect(TextEffect),
    Transition(Transition),
    Animations(SegmentAnimations),
    Speed(Speed),
    Mask(Mask),
    Canvas(BackgroundFilling),
    AudioFade(AudioFade),
    AudioEffect(AudioEffect),
    Sticker(StickerMaterial),
    Text(TextMaterial),
}

impl Material {
    pub fn id(&self) -> &str {
        match self {
            Self::Video(m) => &m.material_id,
            Self::Audio(m) => &m.material_id,
            Self::VideoEffect(m) => &m.global_id,
            Self::Filter(m) => &m.global_id,
            Self::TextBubble(m) => &m.global_id,
            Self::TextEffect(m) => &m.global_id,
            Self::Transition(m) => &m.global_id,
            Self::Animations(m) => &m.animation_id,
            Self::Speed(m) => &m.global_id,
            Self::Mask(m) => &m.global_id,
            Self::Canvas(m) => &m.global_id,
            Self::AudioFade(m) => &m.fade_id,
            Self::AudioEffect(m) => &m.effect_id,
            Self::Sticker(m) => &m.material_id,
            Self::Text(m) => &m.material_id,
        }
    }

    pub fn category(&self) -> MaterialCategory {
        match self {
            Self::Video(_) => MaterialCategory::Videos,
            Self::Audio(_) => MaterialCategory::Audios,
            Self::VideoEffect(_) => MaterialCategory::VideoEffects,
            Self::Filter(_) | Self::TextBubble(_) | Self::TextEffect(_) => MaterialCategory::Effects,
            Self::Transition(_) => MaterialCategory::Transitions,
            Self::Animations(_) => MaterialCategory::MaterialAnimations,
            Self::Speed(_) => MaterialCategory::Speeds,
            Self::Mask(_) => MaterialCategory::Masks,
            Self::Canvas(_) => MaterialCategory::Canvases,
            Self::AudioFade(_) => MaterialCategory::AudioFades,
            Self::AudioEffect(_) => MaterialCategory::AudioEffects,
            Self::Sticker(_) => MaterialCategory::Stickers,
            Self::Text(_) => MaterialCategory::Texts,
        }
    }

    pub fn export_json(&self) -> Value {
        match self {
            Self::Video(m) => m.export_json(),
            Self::Audio(m) => m.export_json(),
            Self::VideoEffect(m) => m.export_json(),
            Self::Filter(m) => m.export_json(),
            Self::TextBubble(m) => m.export_json(),
            Self::TextEffect(m) => m.export_json(),
            Self::Transition(m) => m.export_json(),
            Self::Animations(m) => m.export_json(),
            Self::Speed(m) => m.export_json(),
            Self::Mask(m) => m.export_json(),
            Self::Canvas(m) => m.export_json(),
            Self::AudioFade(m) => m.export_json(),
            Self::AudioEffect(m) => m.export_json(),
            Self::Sticker(m) => m.export_json(),
            Self::Text(m) => m.export_json(),
        }
    }
}

macro_rules! material_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Material {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

material_from! {
    Video => VideoMaterial,
    Audio => AudioMaterial,
    VideoEffect => VideoEffect,
    Filter => Filter,
    TextBubble => TextBubble,
    TextEffect => TextEffect,
    Transition => Transition,
    Animations => SegmentAnimations,
    Speed => Speed,
    Mask => Mask,
    Canvas => BackgroundFilling,
    AudioFade => AudioFade,
    AudioEffect => AudioEffect,
    Sticker => StickerMaterial,
    Text => TextMaterial,
}

impl From<MediaMaterial> for Material {
    fn from(value: MediaMaterial) -> Self {
        match value {
            MediaMaterial::Video(m) => Self::Video(m),
            MediaMaterial::Audio(m) => Self::Audio(m),
        }
    }
}
