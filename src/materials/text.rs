/*!
 * Text materials and the styling components attached to them.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::catalog::FontMeta;
use super::new_id;
use crate::errors::DraftError;

/// Parse `#RRGGBB` into normalized RGB components
pub fn hex_to_rgb(hex: &str) -> Result<(f64, f64, f64), DraftError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DraftError::InvalidParameter(format!("invalid hex color '{}'", hex)));
    }
    let channel = |i: usize| -> Result<f64, DraftError> {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f64 / 255.0)
            .map_err(|_| DraftError::InvalidParameter(format!("invalid hex color '{}'", hex)))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

fn check_alpha(label: &str, alpha: f64) -> Result<(), DraftError> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(DraftError::InvalidParameter(format!(
            "{} alpha must be within [0, 1], got {}",
            label, alpha
        )))
    }
}

/// Character styling of a text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: (f64, f64, f64),
    pub alpha: f64,
    /// 0 left, 1 center, 2 right
    pub align: u8,
    pub vertical: bool,
    pub letter_spacing: i32,
    pub line_spacing: i32,
    pub auto_wrapping: bool,
    pub max_line_width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 8.0,
            bold: false,
            italic: false,
            underline: false,
            color: (1.0, 1.0, 1.0),
            alpha: 1.0,
            align: 0,
            vertical: false,
            letter_spacing: 0,
            line_spacing: 0,
            auto_wrapping: false,
            max_line_width: 0.82,
        }
    }
}

impl TextStyle {
    pub fn validate(&self) -> Result<(), DraftError> {
        check_alpha("text", self.alpha)?;
        if self.align > 2 {
            return Err(DraftError::InvalidParameter(format!(
                "text align must be 0, 1 or 2, got {}",
                self.align
            )));
        }
        if self.size <= 0.0 {
            return Err(DraftError::InvalidParameter(format!(
                "font size must be positive, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

/// Outline drawn around glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBorder {
    pub alpha: f64,
    pub color: (f64, f64, f64),
    /// Width in `[0, 100]`
    pub width: f64,
}

impl TextBorder {
    pub fn new(color: &str, alpha: f64, width: f64) -> Result<Self, DraftError> {
        check_alpha("border", alpha)?;
        if !(0.0..=100.0).contains(&width) {
            return Err(DraftError::InvalidParameter(format!(
                "border width must be within [0, 100], got {}",
                width
            )));
        }
        Ok(Self {
            alpha,
            color: hex_to_rgb(color)?,
            width,
        })
    }

    fn export_json(&self) -> Value {
        json!({
            "content": {
                "solid": {
                    "alpha": self.alpha,
                    "color": [self.color.0, self.color.1, self.color.2],
                }
            },
            "width": self.width / 100.0 * 0.2,
        })
    }
}

/// Filled box behind the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBackground {
    /// `#RRGGBB`
    pub color: String,
    pub style: u8,
    pub alpha: f64,
    pub round_radius: f64,
    pub height: f64,
    pub width: f64,
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
}

impl TextBackground {
    pub fn new(color: &str, style: u8, alpha: f64) -> Result<Self, DraftError> {
        check_alpha("background", alpha)?;
        hex_to_rgb(color)?;
        Ok(Self {
            color: color.to_string(),
            style,
            alpha,
            round_radius: 0.0,
            height: 0.14,
            width: 0.14,
            horizontal_offset: 0.5,
            vertical_offset: 0.5,
        })
    }
}

/// Speech-bubble shape around a text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBubble {
    pub global_id: String,
    pub effect_id: String,
    pub resource_id: String,
}

impl TextBubble {
    pub fn new(effect_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            global_id: new_id(),
            effect_id: effect_id.into(),
            resource_id: resource_id.into(),
        }
    }

    pub fn export_json(&self) -> Value {
        json!({
            "apply_target_type": 0,
            "effect_id": self.effect_id,
            "id": self.global_id,
            "resource_id": self.resource_id,
            "type": "text_shape",
            "value": 1.0,
        })
    }
}

/// Decorative flower-text effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEffect {
    pub global_id: String,
    pub effect_id: String,
    pub resource_id: String,
}

impl TextEffect {
    /// Flower-text resources share their effect id
    pub fn new(effect_id: impl Into<String>) -> Self {
        let effect_id = effect_id.into();
        Self {
            global_id: new_id(),
            resource_id: effect_id.clone(),
            effect_id,
        }
    }

    pub fn export_json(&self) -> Value {
        json!({
            "apply_target_type": 0,
            "effect_id": self.effect_id,
            "id": self.global_id,
            "resource_id": self.resource_id,
            "type": "text_effect",
            "value": 1.0,
            "source_platform": 1,
        })
    }
}

/// The text record behind a text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMaterial {
    pub material_id: String,
    pub text: String,
    pub font: Option<FontMeta>,
    pub style: TextStyle,
    pub border: Option<TextBorder>,
    pub background: Option<TextBackground>,
    /// Fixed layout box in pixels, -1 when unconstrained
    pub fixed_width: i32,
    pub fixed_height: i32,
}

impl TextMaterial {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            material_id: new_id(),
            text: text.into(),
            font: None,
            style,
            border: None,
            background: None,
            fixed_width: -1,
            fixed_height: -1,
        }
    }

    /// The `content` payload: a JSON document embedded as a string
    pub fn content_json(&self) -> Value {
        let (r, g, b) = self.style.color;
        let mut style = json!({
            "fill": {
                "alpha": 1.0,
                "content": {
                    "render_type": "solid",
                    "solid": { "alpha": 1.0, "color": [r, g, b] },
                },
            },
            "range": [0, self.text.chars().count()],
            "size": self.style.size,
            "bold": self.style.bold,
            "italic": self.style.italic,
            "underline": self.style.underline,
        });
        if let Some(border) = &self.border {
            style["strokes"] = json!([border.export_json()]);
        }
        if let Some(font) = &self.font {
            style["font"] = json!({ "id": font.resource_id, "path": "" });
        }
        json!({ "styles": [style], "text": self.text })
    }

    pub fn export_json(&self) -> Value {
        let mut check_flag = 7;
        if self.border.is_some() {
            check_flag |= 8;
        }
        if self.background.is_some() {
            check_flag |= 16;
        }

        let mut value = json!({
            "id": self.material_id,
            "content": self.content_json().to_string(),
            "typesetting": i32::from(self.style.vertical),
            "alignment": self.style.align,
            "letter_spacing": f64::from(self.style.letter_spacing) * 0.05,
            "line_spacing": 0.02 + f64::from(self.style.line_spacing) * 0.05,
            "line_feed": 1,
            "line_max_width": self.style.max_line_width,
            "force_apply_line_max_width": false,
            "check_flag": check_flag,
            "type": if self.style.auto_wrapping { "subtitle" } else { "text" },
            "fixed_width": self.fixed_width,
            "fixed_height": self.fixed_height,
            "global_alpha": self.style.alpha,
        });
        if let Some(bg) = &self.background {
            value["background_style"] = json!(bg.style);
            value["background_color"] = json!(bg.color);
            value["background_alpha"] = json!(bg.alpha);
            value["background_round_radius"] = json!(bg.round_radius);
            value["background_height"] = json!(bg.height);
            value["background_width"] = json!(bg.width);
            value["background_horizontal_offset"] = json!(bg.horizontal_offset);
            value["background_vertical_offset"] = json!(bg.vertical_offset);
        }
        value
    }
}
