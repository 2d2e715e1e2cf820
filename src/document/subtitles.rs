use std::fs;
use std::path::Path;

use log::info;

use super::{Document, TrackOptions};
use crate::app_config::SubtitleConfig;
use crate::errors::DraftError;
use crate::materials::catalog::FontMeta;
use crate::materials::{TextBackground, TextBorder, TextStyle};
use crate::segments::{ClipSettings, TextSegment};
use crate::subtitle::SubtitleCues;
use crate::time_util::TimeRange;
use crate::track::TrackType;

// @const: Fixed text box width on portrait and landscape canvases
const PORTRAIT_TEXT_WIDTH: i32 = 648;
const LANDSCAPE_TEXT_WIDTH: i32 = 1344;

// @struct: How imported cues are styled and placed
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleImportOptions {
    // @field: Shift applied to every cue, in micro-units
    pub time_offset: i64,

    // @field: Segment whose look every cue copies; `text_style` is ignored when set,
    // font, border, background, bubble and effect still override it
    pub style_reference: Option<TextSegment>,

    pub font: Option<FontMeta>,
    pub text_style: TextStyle,

    // @field: Placement; overrides the reference's when both are given
    pub clip_settings: Option<ClipSettings>,

    pub border: Option<TextBorder>,
    pub background: Option<TextBackground>,

    // @field: Bubble as (effect_id, resource_id)
    pub bubble: Option<(String, String)>,

    // @field: Flower-text effect id
    pub effect: Option<String>,

    // @field: Render index offset when the subtitle track has to be created
    pub relative_index: i32,
}

impl Default for SubtitleImportOptions {
    fn default() -> Self {
        Self::from_config(&SubtitleConfig::default())
    }
}

impl SubtitleImportOptions {
    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self {
            time_offset: 0,
            style_reference: None,
            font: None,
            text_style: TextStyle {
                size: config.font_size,
                align: 1,
                auto_wrapping: true,
                ..TextStyle::default()
            },
            clip_settings: Some(ClipSettings::at_y(config.transform_y)),
            border: None,
            background: None,
            bubble: None,
            effect: None,
            relative_index: config.relative_index,
        }
    }

    fn build_segment(&self, text: String, target: TimeRange, fixed_width: i32) -> Result<TextSegment, DraftError> {
        let mut segment = match &self.style_reference {
            Some(reference) => {
                let segment = TextSegment::create_from_template(text, target, reference);
                let fixed_height = segment.material.fixed_height;
                let segment = segment.with_fixed_size(fixed_width, fixed_height);
                match &self.clip_settings {
                    Some(clip) => segment.with_clip(clip.clone()),
                    None => segment,
                }
            }
            None => {
                let clip = self.clip_settings.clone().ok_or_else(|| {
                    DraftError::InvalidParameter("clip settings are required without a style reference".to_string())
                })?;
                TextSegment::new(text, target, self.text_style.clone())?
                    .with_clip(clip)
                    .with_fixed_size(fixed_width, -1)
            }
        };
        if let Some(font) = &self.font {
            segment = segment.with_font(font.clone());
        }
        if let Some(border) = &self.border {
            segment = segment.with_border(border.clone());
        }
        if let Some(background) = &self.background {
            segment = segment.with_background(background.clone());
        }
        if let Some((effect_id, resource_id)) = &self.bubble {
            segment.add_bubble(effect_id, resource_id);
        }
        if let Some(effect_id) = &self.effect {
            segment.add_effect(effect_id);
        }
        Ok(segment)
    }
}

impl Document {
    /// Add every cue of an SRT text as a text segment on `track_name`,
    /// creating the track when no track of that name exists.
    ///
    /// Either all cues are imported or the document is left unchanged.
    pub fn import_srt(
        &mut self,
        content: &str,
        track_name: &str,
        options: &SubtitleImportOptions,
    ) -> Result<&mut Self, DraftError> {
        if options.style_reference.is_none() && options.clip_settings.is_none() {
            return Err(DraftError::InvalidParameter(
                "clip settings are required without a style reference".to_string(),
            ));
        }

        let mut staged = self.clone();
        if !staged.has_track_named(track_name) {
            staged.add_track(TrackType::Text, Some(track_name), TrackOptions::relative(options.relative_index))?;
        }

        let fixed_width = if self.width < self.height {
            PORTRAIT_TEXT_WIDTH
        } else {
            LANDSCAPE_TEXT_WIDTH
        };

        let mut count = 0usize;
        for cue in SubtitleCues::new(content) {
            let cue = cue?;
            let target = cue.timerange(options.time_offset)?;
            let segment = options.build_segment(cue.text, target, fixed_width)?;
            staged.add_segment(segment, Some(track_name))?;
            count += 1;
        }

        *self = staged;
        info!("Imported {} subtitle cue(s) into track '{}'", count, track_name);
        Ok(self)
    }

    /// Read an SRT file and import it with [`Document::import_srt`]
    pub fn import_srt_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        track_name: &str,
        options: &SubtitleImportOptions,
    ) -> Result<&mut Self, DraftError> {
        let content = fs::read_to_string(path.as_ref())?;
        self.import_srt(&content, track_name, options)
    }
}
