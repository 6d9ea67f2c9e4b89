use anyhow::{anyhow, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @module: Burn-in style options

// @const: Hex color, #RGB or #RRGGBB
static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color regex is valid")
});

/// Font sizes the editor offers
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 14..=64;

/// Where the burned-in text is placed on the frame
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitlePosition {
    #[default]
    Bottom,
    Top,
    Left,
    Right,
    Center,
}

impl SubtitlePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

impl std::fmt::Display for SubtitlePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubtitlePosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bottom" => Ok(Self::Bottom),
            "top" => Ok(Self::Top),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            _ => Err(anyhow!("Invalid subtitle position: {}", s)),
        }
    }
}

/// Style parameters sent along with a burn-in request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StyleOptions {
    /// Placement of the text
    #[serde(default)]
    pub position: SubtitlePosition,

    /// Text color as a hex string
    #[serde(default = "default_color")]
    pub color: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Opacity of the box behind the text, 0.0 to 1.0
    #[serde(default = "default_bg_opacity")]
    pub bg_opacity: f64,
}

/// Partial update of `StyleOptions`; unset fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub position: Option<SubtitlePosition>,
    pub color: Option<String>,
    pub font_size: Option<u32>,
    pub bg_opacity: Option<f64>,
}

impl StyleOptions {
    /// New options with the patch applied on top of these
    pub fn merged(&self, patch: StylePatch) -> Self {
        Self {
            position: patch.position.unwrap_or(self.position),
            color: patch.color.unwrap_or_else(|| self.color.clone()),
            font_size: patch.font_size.unwrap_or(self.font_size),
            bg_opacity: patch.bg_opacity.unwrap_or(self.bg_opacity),
        }
    }

    /// Validate the options before they reach the burn-in backend
    pub fn validate(&self) -> Result<()> {
        if !HEX_COLOR_REGEX.is_match(&self.color) {
            return Err(anyhow!("Invalid text color '{}', expected a hex value like #FFFFFF", self.color));
        }

        if self.font_size == 0 {
            return Err(anyhow!("Font size must be a positive integer"));
        }

        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            warn!(
                "Font size {} is outside the usual range {}-{}",
                self.font_size,
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            );
        }

        if !(0.0..=1.0).contains(&self.bg_opacity) {
            return Err(anyhow!("Background opacity must be between 0 and 1, got {}", self.bg_opacity));
        }

        Ok(())
    }

    /// Multipart form fields in the order the backend expects them
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("position", self.position.to_string()),
            ("color", self.color.clone()),
            ("font_size", self.font_size.to_string()),
            ("bg_opacity", self.bg_opacity.to_string()),
        ]
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            position: SubtitlePosition::default(),
            color: default_color(),
            font_size: default_font_size(),
            bg_opacity: default_bg_opacity(),
        }
    }
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_font_size() -> u32 {
    28
}

fn default_bg_opacity() -> f64 {
    0.4
}
