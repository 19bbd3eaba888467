use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::emoji::{EmojiTriggers, TriggerRule};
use crate::error::{Result, SubburnError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub media: MediaConfig,
    pub style: StyleConfig,
    pub emoji: EmojiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the whisper command line binary
    pub binary_path: String,
    /// Whisper model name (tiny, base, small, medium, large)
    pub model: String,
    /// Spoken language passed to whisper
    pub language: String,
    /// Extra arguments appended to every whisper invocation
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    /// Directory the styling file must live under. ffmpeg runs from here so the
    /// subtitles filter can use a relative path. Defaults to the working directory.
    pub project_root: Option<PathBuf>,
    /// Fonts directory name, relative to the project root
    pub fonts_dir: String,
    /// Suffix appended to the source stem for the burned video
    pub output_suffix: String,
    /// Stem suffixes removed before appending `output_suffix`
    pub strip_suffixes: Vec<String>,
    /// Additional encoding options for the burn, e.g. ["-preset", "medium", "-crf", "23"]
    pub subtitle_options: Vec<String>,
}

/// Styling for the single `Default` ASS style.
///
/// Treated as an immutable snapshot: derived styles are produced with the
/// `with_*` copies rather than by mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font_name: String,
    pub font_size: u32,
    pub outline: f64,
    pub shadow: f64,
    /// Numpad alignment, 1-9
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    /// Colours in ASS `&HAABBGGRR` notation
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub play_res_x: u32,
    pub play_res_y: u32,
    pub emoji_font: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Append emoji to lines that match a trigger
    pub enabled: bool,
    /// Ordered trigger rules, first match wins
    pub triggers: Vec<TriggerRule>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "small".to_string(),
            language: "en".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            project_root: None,
            fonts_dir: "fonts".to_string(),
            output_suffix: "_subtitled".to_string(),
            strip_suffixes: vec!["_crop916".to_string()],
            subtitle_options: vec![],
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 26,
            outline: 2.0,
            shadow: 0.0,
            alignment: 2,
            margin_l: 80,
            margin_r: 80,
            margin_v: 120,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H00000000".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            play_res_x: 1080,
            play_res_y: 1920,
            emoji_font: Some("Apple Color Emoji".to_string()),
        }
    }
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            triggers: TriggerRule::defaults(),
        }
    }
}

impl StyleConfig {
    /// Copy of this style with the play resolution replaced
    pub fn with_canvas(&self, width: u32, height: u32) -> Self {
        Self {
            play_res_x: width,
            play_res_y: height,
            ..self.clone()
        }
    }

    /// Copy of this style with the emoji font replaced
    pub fn with_emoji_font(&self, emoji_font: Option<String>) -> Self {
        Self {
            emoji_font,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.alignment) {
            return Err(SubburnError::Config(format!(
                "Alignment must be between 1 and 9, got {}",
                self.alignment
            )));
        }
        if self.play_res_x == 0 || self.play_res_y == 0 {
            return Err(SubburnError::Config(format!(
                "Canvas size must be non-zero, got {}x{}",
                self.play_res_x, self.play_res_y
            )));
        }
        if self.font_name.trim().is_empty() {
            return Err(SubburnError::Config("Font name must not be empty".to_string()));
        }
        Ok(())
    }
}

impl MediaConfig {
    /// Configured project root, or the current directory
    pub fn resolve_project_root(&self) -> Result<PathBuf> {
        match &self.project_root {
            Some(root) => Ok(root.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubburnError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubburnError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubburnError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Check field ranges and compile the trigger table once
    pub fn validate(&self) -> Result<()> {
        self.style.validate()?;
        EmojiTriggers::from_rules(&self.emoji.triggers)?;
        Ok(())
    }
}
