use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the settings used when
/// creating documents, importing subtitles and running the store helpers.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Canvas used for new documents
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Target application flavor
    #[serde(default)]
    pub flavor: AppFlavor,

    /// Subtitle import defaults
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Draft cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Export queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Which editing application the export targets
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppFlavor {
    // @flavor: international build
    #[default]
    CapCut,
    // @flavor: mainland build
    JianYing,
}

impl AppFlavor {
    // @returns: Materials key holding masks
    pub fn mask_key(&self) -> &'static str {
        match self {
            Self::CapCut => "common_mask",
            Self::JianYing => "masks",
        }
    }
}

impl std::fmt::Display for AppFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapCut => write!(f, "capcut"),
            Self::JianYing => write!(f, "jianying"),
        }
    }
}

impl std::str::FromStr for AppFlavor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "capcut" => Ok(Self::CapCut),
            "jianying" => Ok(Self::JianYing),
            _ => Err(anyhow!("Invalid app flavor: {}", s)),
        }
    }
}

/// Canvas dimensions and frame rate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

/// Defaults applied by the subtitle importer
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Track that receives imported cues
    #[serde(default = "default_subtitle_track")]
    pub track_name: String,

    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Vertical placement, -1 bottom to 1 top
    #[serde(default = "default_transform_y")]
    pub transform_y: f64,

    /// Render index offset of a newly created subtitle track
    #[serde(default = "default_subtitle_relative_index")]
    pub relative_index: i32,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            track_name: default_subtitle_track(),
            font_size: default_font_size(),
            transform_y: default_transform_y(),
            relative_index: default_subtitle_relative_index(),
        }
    }
}

/// Draft cache configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Key prefix
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,

    /// Entry lifetime in hours
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: default_cache_prefix(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

/// Export queue configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueueConfig {
    /// Retries before a task is marked failed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_fps() -> u32 {
    30
}

fn default_subtitle_track() -> String {
    "subtitle".to_string()
}

fn default_font_size() -> f64 {
    5.0
}

fn default_transform_y() -> f64 {
    -0.8
}

fn default_subtitle_relative_index() -> i32 {
    999
}

fn default_cache_prefix() -> String {
    "draft_cache".to_string()
}

fn default_ttl_hours() -> u64 {
    48 // two days
}

fn default_max_retries() -> u32 {
    3
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context(format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json).context(format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(anyhow!(
                "Canvas dimensions must be positive, got {}x{}",
                self.canvas.width,
                self.canvas.height
            ));
        }
        if self.canvas.fps == 0 {
            return Err(anyhow!("Frame rate must be positive"));
        }
        if self.subtitle.track_name.trim().is_empty() {
            return Err(anyhow!("Subtitle track name must not be empty"));
        }
        if self.subtitle.font_size <= 0.0 {
            return Err(anyhow!("Subtitle font size must be positive, got {}", self.subtitle.font_size));
        }
        if !(-1.0..=1.0).contains(&self.subtitle.transform_y) {
            return Err(anyhow!(
                "Subtitle transform_y must be within [-1, 1], got {}",
                self.subtitle.transform_y
            ));
        }
        if self.cache.ttl_hours == 0 {
            return Err(anyhow!("Cache TTL must be at least one hour"));
        }
        Ok(())
    }
}
