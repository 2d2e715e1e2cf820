use crate::errors::DraftError;
use crate::materials::catalog::{AnimationMeta, AnimationTarget, FontMeta};
use crate::materials::{
    Material, SegmentAnimations, TextBackground, TextBorder, TextBubble, TextEffect, TextMaterial, TextStyle, new_id,
};
use crate::time_util::TimeRange;

use super::media::push_animation;
use super::{ClipSettings, PlacedSegment, SegmentKind};

/// A segment showing a piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub segment_id: String,
    pub target_timerange: TimeRange,
    pub material: TextMaterial,
    pub clip_settings: ClipSettings,
    animations: Option<SegmentAnimations>,
    bubble: Option<TextBubble>,
    effect: Option<TextEffect>,
    extra_material_refs: Vec<String>,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, target: TimeRange, style: TextStyle) -> Result<Self, DraftError> {
        style.validate()?;
        Ok(Self {
            segment_id: new_id(),
            target_timerange: target,
            material: TextMaterial::new(text, style),
            clip_settings: ClipSettings::default(),
            animations: None,
            bubble: None,
            effect: None,
            extra_material_refs: Vec::new(),
        })
    }

    /// Build a segment styled like `template`, with fresh identifiers for
    /// the segment, its text record and every decoration
    pub fn create_from_template(text: impl Into<String>, target: TimeRange, template: &TextSegment) -> Self {
        let mut material = template.material.clone();
        material.material_id = new_id();
        material.text = text.into();

        let mut segment = Self {
            segment_id: new_id(),
            target_timerange: target,
            material,
            clip_settings: template.clip_settings.clone(),
            animations: None,
            bubble: None,
            effect: None,
            extra_material_refs: Vec::new(),
        };

        for old_ref in &template.extra_material_refs {
            if let Some(set) = template.animations.as_ref().filter(|a| &a.animation_id == old_ref) {
                let mut fresh = set.clone();
                fresh.animation_id = new_id();
                segment.extra_material_refs.push(fresh.animation_id.clone());
                segment.animations = Some(fresh);
            } else if let Some(bubble) = template.bubble.as_ref().filter(|b| &b.global_id == old_ref) {
                segment.set_bubble(TextBubble::new(bubble.effect_id.clone(), bubble.resource_id.clone()));
            } else if let Some(effect) = template.effect.as_ref().filter(|e| &e.global_id == old_ref) {
                segment.set_effect(TextEffect::new(effect.effect_id.clone()));
            }
        }
        segment
    }

    pub fn text(&self) -> &str {
        &self.material.text
    }

    pub fn extra_material_refs(&self) -> &[String] {
        &self.extra_material_refs
    }

    pub fn with_font(mut self, font: FontMeta) -> Self {
        self.material.font = Some(font);
        self
    }

    pub fn with_border(mut self, border: TextBorder) -> Self {
        self.material.border = Some(border);
        self
    }

    pub fn with_background(mut self, background: TextBackground) -> Self {
        self.material.background = Some(background);
        self
    }

    pub fn with_clip(mut self, clip: ClipSettings) -> Self {
        self.clip_settings = clip;
        self
    }

    /// Fixed layout box in pixels, -1 leaves a dimension unconstrained
    pub fn with_fixed_size(mut self, width: i32, height: i32) -> Self {
        self.material.fixed_width = width;
        self.material.fixed_height = height;
        self
    }

    pub fn add_animation(&mut self, meta: &AnimationMeta, duration: Option<i64>) -> Result<&mut Self, DraftError> {
        push_animation(
            &mut self.animations,
            &mut self.extra_material_refs,
            AnimationTarget::Text,
            meta,
            duration,
            self.target_timerange.duration,
        )?;
        Ok(self)
    }

    /// Set or replace the bubble
    pub fn set_bubble(&mut self, bubble: TextBubble) -> &mut Self {
        replace_ref(&mut self.extra_material_refs, self.bubble.as_ref().map(|b| b.global_id.as_str()), &bubble.global_id);
        self.bubble = Some(bubble);
        self
    }

    /// Set or replace the flower-text effect
    pub fn set_effect(&mut self, effect: TextEffect) -> &mut Self {
        replace_ref(&mut self.extra_material_refs, self.effect.as_ref().map(|e| e.global_id.as_str()), &effect.global_id);
        self.effect = Some(effect);
        self
    }

    pub fn add_bubble(&mut self, effect_id: &str, resource_id: &str) -> &mut Self {
        self.set_bubble(TextBubble::new(effect_id, resource_id))
    }

    pub fn add_effect(&mut self, effect_id: &str) -> &mut Self {
        self.set_effect(TextEffect::new(effect_id))
    }

    pub(super) fn into_parts(self) -> (PlacedSegment, Vec<Material>) {
        let placed = PlacedSegment {
            kind: SegmentKind::Text,
            segment_id: self.segment_id,
            material_id: self.material.material_id.clone(),
            target_timerange: self.target_timerange,
            playback: None,
            clip: Some(self.clip_settings),
            extra_material_refs: self.extra_material_refs,
        };

        let mut materials: Vec<Material> = vec![self.material.into()];
        materials.extend(self.animations.map(Material::from));
        materials.extend(self.bubble.map(Material::from));
        materials.extend(self.effect.map(Material::from));
        (placed, materials)
    }
}

fn replace_ref(refs: &mut Vec<String>, old: Option<&str>, new: &str) {
    match old.and_then(|old| refs.iter().position(|r| r == old)) {
        Some(pos) => refs[pos] = new.to_string(),
        None => refs.push(new.to_string()),
    }
}
