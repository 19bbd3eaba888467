// Transcription collaborators
//
// A transcriber turns a video into an SRT file on disk. The workflow decides
// where that file should land (`expected_srt_path`) so that an existing
// transcript can be reused without asking the transcriber at all.
//
// - whisper: OpenAI Whisper command line tool

pub mod whisper;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe `video_path`, writing an SRT into `output_dir`. Returns the SRT path.
    async fn transcribe(&self, video_path: &Path, output_dir: &Path) -> Result<PathBuf>;

    /// Check that the transcriber can be executed
    async fn check_availability(&self) -> Result<()>;
}

/// Transcriber implementation type
#[derive(Debug, Clone)]
pub enum TranscriberImplementation {
    WhisperCli,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(
        implementation: TranscriberImplementation,
        config: TranscriberConfig,
    ) -> Box<dyn TranscriberTrait> {
        match implementation {
            TranscriberImplementation::WhisperCli => Box::new(whisper::WhisperCliTranscriber::new(config)),
        }
    }

    pub fn create_default(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        Self::create_transcriber(TranscriberImplementation::WhisperCli, config)
    }
}

/// Where the transcript for `video_path` is expected: `<dir>/<stem>.srt`
pub fn expected_srt_path(video_path: &Path) -> Result<PathBuf> {
    let stem = video_path
        .file_stem()
        .ok_or_else(|| SubburnError::Config(format!("Invalid video filename: {}", video_path.display())))?;
    let dir = video_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{}.srt", stem.to_string_lossy())))
}

/// Locate the SRT a transcriber produced for `video_path` in `output_dir`.
///
/// The exact `<stem>.srt` is preferred; otherwise the first `<stem>*.srt` in
/// name order is taken.
pub fn find_srt_output(video_path: &Path, output_dir: &Path) -> Result<Option<PathBuf>> {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let expected = output_dir.join(format!("{}.srt", stem));
    if expected.exists() {
        return Ok(Some(expected));
    }

    let mut matches = Vec::new();
    for entry in std::fs::read_dir(output_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if name.starts_with(&stem) && name.ends_with(".srt") && path.is_file() {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}
