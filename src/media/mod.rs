// Media collaborators
//
// - Processor: ffmpeg burn and ffprobe frame-size probe behind one trait
// - Commands: command builder and filter escaping

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Burn the styling file into the video, keeping the audio stream
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Pixel width and height of the first video stream, if known
    async fn probe_dimensions(&self, video_path: &Path) -> Result<Option<(u32, u32)>>;

    /// Check if the media processor is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig, project_root: PathBuf) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config, project_root))
    }
}

/// Output path of the burned video: `<stem><suffix><.ext>` beside the source,
/// with any configured stem suffix removed first
pub fn burned_output_path(video_path: &Path, config: &MediaConfig) -> Result<PathBuf> {
    let stem = video_path
        .file_stem()
        .ok_or_else(|| SubburnError::Config(format!("Invalid video filename: {}", video_path.display())))?
        .to_string_lossy()
        .into_owned();

    let base = config
        .strip_suffixes
        .iter()
        .find_map(|suffix| stem.strip_suffix(suffix.as_str()))
        .unwrap_or(&stem);

    let file_name = match video_path.extension() {
        Some(ext) => format!("{}{}.{}", base, config.output_suffix, ext.to_string_lossy()),
        None => format!("{}{}", base, config.output_suffix),
    };
    Ok(video_path.with_file_name(file_name))
}

/// Whether `path` names a file this tool produced rather than a source video
pub fn is_burned_output(path: &Path, config: &MediaConfig) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(config.output_suffix.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burned_output_path() {
        let config = MediaConfig::default();
        assert_eq!(
            burned_output_path(Path::new("/clips/talk.mp4"), &config).unwrap(),
            PathBuf::from("/clips/talk_subtitled.mp4")
        );
        assert_eq!(
            burned_output_path(Path::new("/clips/talk_crop916.mp4"), &config).unwrap(),
            PathBuf::from("/clips/talk_subtitled.mp4")
        );
    }

    #[test]
    fn test_is_burned_output() {
        let config = MediaConfig::default();
        assert!(is_burned_output(Path::new("talk_subtitled.mp4"), &config));
        assert!(is_burned_output(Path::new("talk_crop916_subtitled.mp4"), &config));
        assert!(!is_burned_output(Path::new("talk.mp4"), &config));
    }
}
