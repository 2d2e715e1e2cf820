use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::new_id;
use crate::errors::DraftError;
use crate::time_util::SEC;

/// Still images are given a nominal duration of three hours
pub const PHOTO_DURATION: i64 = 10_800 * SEC;

// @struct: Quadrilateral crop, corners normalized to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSettings {
    pub upper_left_x: f64,
    pub upper_left_y: f64,
    pub upper_right_x: f64,
    pub upper_right_y: f64,
    pub lower_left_x: f64,
    pub lower_left_y: f64,
    pub lower_right_x: f64,
    pub lower_right_y: f64,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            upper_left_x: 0.0,
            upper_left_y: 0.0,
            upper_right_x: 1.0,
            upper_right_y: 0.0,
            lower_left_x: 0.0,
            lower_left_y: 1.0,
            lower_right_x: 1.0,
            lower_right_y: 1.0,
        }
    }
}

impl CropSettings {
    pub fn export_json(&self) -> Value {
        json!({
            "upper_left_x": self.upper_left_x,
            "upper_left_y": self.upper_left_y,
            "upper_right_x": self.upper_right_x,
            "upper_right_y": self.upper_right_y,
            "lower_left_x": self.lower_left_x,
            "lower_left_y": self.lower_left_y,
            "lower_right_x": self.lower_right_x,
            "lower_right_y": self.lower_right_y,
        })
    }
}

/// Whether a visual asset is a moving picture or a still
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    #[default]
    Video,
    Photo,
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Photo => "photo",
        }
    }
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// A video or image asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMaterial {
    pub material_id: String,
    pub material_name: String,
    pub path: String,
    /// Duration in micro-units
    pub duration: i64,
    pub width: u32,
    pub height: u32,
    pub material_type: VideoKind,
    pub crop_settings: CropSettings,
}

impl VideoMaterial {
    /// Describe a video file. Probing the media is left to the caller.
    pub fn new(path: impl Into<String>, duration: i64, width: u32, height: u32) -> Result<Self, DraftError> {
        let path = path.into();
        if duration < 0 {
            return Err(DraftError::InvalidRange(format!(
                "material '{}' has negative duration {}",
                path, duration
            )));
        }
        Ok(Self {
            material_id: new_id(),
            material_name: file_name_of(&path),
            path,
            duration,
            width,
            height,
            material_type: VideoKind::Video,
            crop_settings: CropSettings::default(),
        })
    }

    /// Describe a still image
    pub fn photo(path: impl Into<String>, width: u32, height: u32) -> Self {
        let path = path.into();
        Self {
            material_id: new_id(),
            material_name: file_name_of(&path),
            path,
            duration: PHOTO_DURATION,
            width,
            height,
            material_type: VideoKind::Photo,
            crop_settings: CropSettings::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    pub fn with_crop(mut self, crop: CropSettings) -> Self {
        self.crop_settings = crop;
        self
    }

    pub fn is_photo(&self) -> bool {
        self.material_type == VideoKind::Photo
    }

    pub fn export_json(&self) -> Value {
        json!({
            "audio_fade": null,
            "category_id": "",
            "category_name": "local",
            "check_flag": 63487,
            "crop": self.crop_settings.export_json(),
            "crop_ratio": "free",
            "crop_scale": 1.0,
            "duration": self.duration,
            "height": self.height,
            "id": self.material_id,
            "local_material_id": "",
            "material_id": "",
            "material_name": self.material_name,
            "media_path": "",
            "path": self.path,
            "type": self.material_type.as_str(),
            "width": self.width,
        })
    }
}

/// An audio asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMaterial {
    pub material_id: String,
    pub material_name: String,
    pub path: String,
    /// Duration in micro-units
    pub duration: i64,
}

impl AudioMaterial {
    pub fn new(path: impl Into<String>, duration: i64) -> Result<Self, DraftError> {
        let path = path.into();
        if duration < 0 {
            return Err(DraftError::InvalidRange(format!(
                "material '{}' has negative duration {}",
                path, duration
            )));
        }
        Ok(Self {
            material_id: new_id(),
            material_name: file_name_of(&path),
            path,
            duration,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    pub fn export_json(&self) -> Value {
        json!({
            "app_id": 0,
            "category_id": "",
            "category_name": "local",
            "check_flag": 3,
            "copyright_limit_type": "none",
            "duration": self.duration,
            "effect_id": "",
            "formula_id": "",
            "id": self.material_id,
            "intensifies_path": "",
            "is_ai_clone_tone": false,
            "is_text_edit_overdub": false,
            "is_ugc": false,
            "local_material_id": "",
            "music_id": self.material_id,
            "name": self.material_name,
            "path": self.path,
            "query": "",
            "request_id": "",
            "resource_id": "",
            "search_id": "",
            "source_from": "",
            "source_platform": 0,
            "team_id": "",
            "text_id": "",
            "tone_category_id": "",
            "tone_category_name": "",
            "tone_effect_id": "",
            "tone_effect_name": "",
            "tone_platform": "",
            "tone_second_category_id": "",
            "tone_second_category_name": "",
            "tone_speaker": "",
            "tone_type": "",
            "type": "extract_music",
            "video_id": "",
            "wave_points": [],
        })
    }
}

/// A replaceable media asset, used by the template replace operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaMaterial {
    Video(VideoMaterial),
    Audio(AudioMaterial),
}

impl MediaMaterial {
    pub fn material_id(&self) -> &str {
        match self {
            Self::Video(m) => &m.material_id,
            Self::Audio(m) => &m.material_id,
        }
    }

    pub fn duration(&self) -> i64 {
        match self {
            Self::Video(m) => m.duration,
            Self::Audio(m) => m.duration,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Audio(_) => "audio",
        }
    }
}

impl From<VideoMaterial> for MediaMaterial {
    fn from(value: VideoMaterial) -> Self {
        Self::Video(value)
    }
}

impl From<AudioMaterial> for MediaMaterial {
    fn from(value: AudioMaterial) -> Self {
        Self::Audio(value)
    }
}
