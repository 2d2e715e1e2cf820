use crate::errors::DraftError;
use crate::materials::catalog::{AnimationMeta, AnimationTarget, EffectMeta, MaskMeta, TransitionMeta, VideoEffectType};
use crate::materials::effects::Fill;
use crate::materials::{
    Animation, AudioEffect, AudioFade, AudioMaterial, BackgroundFilling, Filter, Mask, Material, SegmentAnimations,
    Speed, Transition, VideoEffect, VideoMaterial, new_id,
};
use crate::time_util::TimeRange;

use super::{ClipSettings, PlacedSegment, Playback, SegmentKind};

/// How a media segment samples its material
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOptions {
    /// Slice of the material to play; derived from the target range and speed
    /// when omitted
    pub source_timerange: Option<TimeRange>,
    pub speed: Option<f64>,
    pub volume: f64,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            source_timerange: None,
            speed: None,
            volume: 1.0,
        }
    }
}

/// Resolve target range, source range and speed against each other.
///
/// With both a source range and a speed the target duration follows from
/// them; with only a source range the speed is derived; otherwise the source
/// starts at zero and covers the target duration times the speed.
fn resolve_playback(
    material_name: &str,
    material_duration: i64,
    target: TimeRange,
    options: &MediaOptions,
) -> Result<(TimeRange, Playback), DraftError> {
    if let Some(speed) = options.speed {
        if speed <= 0.0 || !speed.is_finite() {
            return Err(DraftError::InvalidParameter(format!("speed must be positive, got {}", speed)));
        }
    }

    let (target, source, speed) = match (options.source_timerange, options.speed) {
        (Some(source), Some(speed)) => {
            let duration = (source.duration as f64 / speed).round() as i64;
            (TimeRange::new(target.start, duration)?, source, speed)
        }
        (Some(source), None) => {
            if target.duration == 0 {
                return Err(DraftError::InvalidRange(format!(
                    "cannot derive speed for '{}' from an empty target range",
                    material_name
                )));
            }
            (target, source, source.duration as f64 / target.duration as f64)
        }
        (None, speed) => {
            let speed = speed.unwrap_or(1.0);
            let source = TimeRange::new(0, (target.duration as f64 * speed).round() as i64)?;
            (target, source, speed)
        }
    };

    if source.start < 0 || source.end() > material_duration {
        return Err(DraftError::InvalidRange(format!(
            "source range {} exceeds material '{}' of duration {}",
            source, material_name, material_duration
        )));
    }

    Ok((
        target,
        Playback {
            source_timerange: source,
            speed,
            volume: options.volume,
        },
    ))
}

fn animation_window(meta: &AnimationMeta, duration: Option<i64>, segment_duration: i64) -> Result<Animation, DraftError> {
    use crate::materials::catalog::AnimationKind;

    let duration = duration.unwrap_or(meta.duration);
    if duration < 0 || duration > segment_duration {
        return Err(DraftError::InvalidRange(format!(
            "animation '{}' of {} does not fit a segment of {}",
            meta.title, duration, segment_duration
        )));
    }
    let start = match meta.kind {
        AnimationKind::Outro => segment_duration - duration,
        AnimationKind::Intro | AnimationKind::Group => 0,
    };
    Ok(Animation {
        meta: meta.clone(),
        start,
        duration,
    })
}

/// Add an animation to a lazily created animation set, recording its id in
/// `refs` on first use
pub(super) fn push_animation(
    slot: &mut Option<SegmentAnimations>,
    refs: &mut Vec<String>,
    expected: AnimationTarget,
    meta: &AnimationMeta,
    duration: Option<i64>,
    segment_duration: i64,
) -> Result<(), DraftError> {
    if meta.target != expected {
        return Err(DraftError::TypeMismatch(format!(
            "animation '{}' targets {:?} segments, not {:?}",
            meta.title, meta.target, expected
        )));
    }
    let animation = animation_window(meta, duration, segment_duration)?;
    match slot {
        Some(set) => set.add(animation),
        None => {
            let mut set = SegmentAnimations::new();
            set.add(animation)?;
            refs.push(set.animation_id.clone());
            *slot = Some(set);
            Ok(())
        }
    }
}

/// Shape and placement of a video mask
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOptions {
    /// Center in material pixels relative to the material center
    pub center_x: f64,
    pub center_y: f64,
    /// Height as a fraction of the material height
    pub size: f64,
    pub rotation: f64,
    /// `[0, 100]`
    pub feather: f64,
    pub invert: bool,
    /// Rectangle width as a fraction of the material width, rectangles only
    pub rect_width: Option<f64>,
    /// `[0, 100]`, rectangles only
    pub round_corner: Option<f64>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            size: 0.5,
            rotation: 0.0,
            feather: 0.0,
            invert: false,
            rect_width: None,
            round_corner: None,
        }
    }
}

/// A segment playing a video or image material
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSegment {
    pub segment_id: String,
    pub material: VideoMaterial,
    pub target_timerange: TimeRange,
    pub playback: Playback,
    pub clip_settings: ClipSettings,
    speed: Speed,
    animations: Option<SegmentAnimations>,
    effects: Vec<VideoEffect>,
    filters: Vec<Filter>,
    mask: Option<Mask>,
    transition: Option<Transition>,
    background_filling: Option<BackgroundFilling>,
    extra_material_refs: Vec<String>,
}

impl VideoSegment {
    pub fn new(material: &VideoMaterial, target: TimeRange, options: MediaOptions) -> Result<Self, DraftError> {
        let (target, playback) = resolve_playback(&material.material_name, material.duration, target, &options)?;
        let speed = Speed::new(playback.speed);
        Ok(Self {
            segment_id: new_id(),
            material: material.clone(),
            target_timerange: target,
            playback,
            clip_settings: ClipSettings::default(),
            extra_material_refs: vec![speed.global_id.clone()],
            speed,
            animations: None,
            effects: Vec::new(),
            filters: Vec::new(),
            mask: None,
            transition: None,
            background_filling: None,
        })
    }

    pub fn with_clip(mut self, clip: ClipSettings) -> Self {
        self.clip_settings = clip;
        self
    }

    pub fn extra_material_refs(&self) -> &[String] {
        &self.extra_material_refs
    }

    /// Add an intro, outro or group animation; duration defaults to the
    /// animation's own
    pub fn add_animation(&mut self, meta: &AnimationMeta, duration: Option<i64>) -> Result<&mut Self, DraftError> {
        push_animation(
            &mut self.animations,
            &mut self.extra_material_refs,
            AnimationTarget::Video,
            meta,
            duration,
            self.target_timerange.duration,
        )?;
        Ok(self)
    }

    pub fn add_effect(&mut self, effect_type: &VideoEffectType, params: Option<&[Option<f64>]>) -> Result<&mut Self, DraftError> {
        let effect = VideoEffect::new(effect_type, params, 0)?;
        self.extra_material_refs.push(effect.global_id.clone());
        self.effects.push(effect);
        Ok(self)
    }

    /// Add a filter at `intensity` percent
    pub fn add_filter(&mut self, meta: &EffectMeta, intensity: f64) -> Result<&mut Self, DraftError> {
        let filter = Filter::new(meta, intensity, 0)?;
        self.extra_material_refs.push(filter.global_id.clone());
        self.filters.push(filter);
        Ok(self)
    }

    pub fn add_mask(&mut self, meta: &MaskMeta, options: MaskOptions) -> Result<&mut Self, DraftError> {
        if self.mask.is_some() {
            return Err(DraftError::InvalidParameter(format!(
                "segment {} already has a mask",
                self.segment_id
            )));
        }
        if !(0.0..=100.0).contains(&options.feather) {
            return Err(DraftError::InvalidParameter(format!(
                "mask feather must be within [0, 100], got {}",
                options.feather
            )));
        }
        let width = self.material.width.max(1) as f64;
        let height = self.material.height.max(1) as f64;
        let mask_width = match options.rect_width {
            Some(w) if meta.resource_type == "rectangle" => w,
            _ => options.size * height * meta.default_aspect_ratio / width,
        };
        let mask = Mask {
            global_id: new_id(),
            meta: meta.clone(),
            center_x: options.center_x * 2.0 / width,
            center_y: options.center_y * 2.0 / height,
            width: mask_width,
            height: options.size,
            aspect_ratio: meta.default_aspect_ratio,
            rotation: options.rotation,
            invert: options.invert,
            feather: options.feather / 100.0,
            round_corner: options.round_corner.unwrap_or(0.0) / 100.0,
        };
        self.extra_material_refs.push(mask.global_id.clone());
        self.mask = Some(mask);
        Ok(self)
    }

    /// Set the transition into the next segment
    pub fn add_transition(&mut self, meta: &TransitionMeta, duration: Option<i64>) -> Result<&mut Self, DraftError> {
        if self.transition.is_some() {
            return Err(DraftError::InvalidParameter(format!(
                "segment {} already has a transition",
                self.segment_id
            )));
        }
        let transition = Transition::new(meta, duration)?;
        self.extra_material_refs.push(transition.global_id.clone());
        self.transition = Some(transition);
        Ok(self)
    }

    pub fn add_background_filling(&mut self, fill: Fill) -> Result<&mut Self, DraftError> {
        if self.background_filling.is_some() {
            return Err(DraftError::InvalidParameter(format!(
                "segment {} already has a background filling",
                self.segment_id
            )));
        }
        let filling = BackgroundFilling::new(fill)?;
        self.extra_material_refs.push(filling.global_id.clone());
        self.background_filling = Some(filling);
        Ok(self)
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Video,
            segment_id: self.segment_id,
            material_id: self.material.material_id.clone(),
            target_timerange: self.target_timerange,
            playback: Some(self.playback),
            clip: Some(self.clip_settings),
            extra_material_refs: self.extra_material_refs,
        };

        let mut materials: Vec<Material> = vec![self.material.into(), self.speed.into()];
        materials.extend(self.animations.map(Material::from));
        materials.extend(self.effects.into_iter().map(Material::from));
        materials.extend(self.filters.into_iter().map(Material::from));
        materials.extend(self.mask.map(Material::from));
        materials.extend(self.transition.map(Material::from));
        materials.extend(self.background_filling.map(Material::from));
        (placed, materials)
    }
}

/// A segment playing an audio material
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub segment_id: String,
    pub material: AudioMaterial,
    pub target_timerange: TimeRange,
    pub playback: Playback,
    speed: Speed,
    fade: Option<AudioFade>,
    effects: Vec<AudioEffect>,
    extra_material_refs: Vec<String>,
}

impl AudioSegment {
    pub fn new(material: &AudioMaterial, target: TimeRange, options: MediaOptions) -> Result<Self, DraftError> {
        let (target, playback) = resolve_playback(&material.material_name, material.duration, target, &options)?;
        let speed = Speed::new(playback.speed);
        Ok(Self {
            segment_id: new_id(),
            material: material.clone(),
            target_timerange: target,
            playback,
            extra_material_refs: vec![speed.global_id.clone()],
            speed,
            fade: None,
            effects: Vec::new(),
        })
    }

    pub fn extra_material_refs(&self) -> &[String] {
        &self.extra_material_refs
    }

    pub fn add_fade(&mut self, in_duration: i64, out_duration: i64) -> Result<&mut Self, DraftError> {
        if self.fade.is_some() {
            return Err(DraftError::InvalidParameter(format!(
                "segment {} already has a fade",
                self.segment_id
            )));
        }
        let fade = AudioFade::new(in_duration, out_duration)?;
        self.extra_material_refs.push(fade.fade_id.clone());
        self.fade = Some(fade);
        Ok(self)
    }

    pub fn add_effect(&mut self, meta: &EffectMeta, params: Option<&[Option<f64>]>) -> Result<&mut Self, DraftError> {
        let effect = AudioEffect::new(meta, params)?;
        self.extra_material_refs.push(effect.effect_id.clone());
        self.effects.push(effect);
        Ok(self)
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Audio,
            segment_id: self.segment_id,
            material_id: self.material.material_id.clone(),
            target_timerange: self.target_timerange,
            playback: Some(self.playback),
            clip: None,
            extra_material_refs: self.extra_material_refs,
        };

        let mut materials: Vec<Material> = vec![self.material.into(), self.speed.into()];
        materials.extend(self.fade.map(Material::from));
        materials.extend(self.effects.into_iter().map(Material::from));
        (placed, materials)
    }
}
