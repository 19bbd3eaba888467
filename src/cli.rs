use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::StyleConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe, style and burn subtitles into a single video
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Whisper model to use
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        style: StyleArgs,

        /// Do not append emoji to matching lines
        #[arg(long)]
        no_emoji: bool,

        /// Regenerate every output even if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Number of videos processed at the same time
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Do not append emoji to matching lines
        #[arg(long)]
        no_emoji: bool,

        /// Regenerate every output even if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Append emoji to an SRT file, writing <name>_emoji.srt
    Annotate {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Convert an SRT file to a styled ASS file
    Convert {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output ASS file (defaults to the input with an .ass extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width, overrides the configured play resolution
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Canvas height, overrides the configured play resolution
        #[arg(long, requires = "width")]
        height: Option<u32>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Burn an existing ASS file into a video
    Burn {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// ASS subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "subburn.toml")]
        output: PathBuf,
    },
}

/// Style overrides applied on top of the configuration
#[derive(ClapArgs, Debug, Default)]
pub struct StyleArgs {
    /// Font family name
    #[arg(long)]
    pub font_name: Option<String>,

    /// Font size in points
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Vertical margin
    #[arg(long)]
    pub margin_v: Option<u32>,

    /// Outline width
    #[arg(long)]
    pub outline: Option<f64>,

    /// Shadow depth
    #[arg(long)]
    pub shadow: Option<f64>,

    /// Numpad alignment (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub alignment: Option<u8>,

    /// Font used for emoji glyphs
    #[arg(long)]
    pub emoji_font: Option<String>,
}

impl StyleArgs {
    /// A copy of `base` with every given override applied
    pub fn apply(&self, base: &StyleConfig) -> StyleConfig {
        let mut style = base.clone();
        if let Some(font_name) = &self.font_name {
            style.font_name = font_name.clone();
        }
        if let Some(font_size) = self.font_size {
            style.font_size = font_size;
        }
        if let Some(margin_v) = self.margin_v {
            style.margin_v = margin_v;
        }
        if let Some(outline) = self.outline {
            style.outline = outline;
        }
        if let Some(shadow) = self.shadow {
            style.shadow = shadow;
        }
        if let Some(alignment) = self.alignment {
            style.alignment = alignment;
        }
        if let Some(emoji_font) = &self.emoji_font {
            style.emoji_font = Some(emoji_font.clone());
        }
        style
    }
}
