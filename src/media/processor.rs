use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};
use super::{MediaCommandBuilder, MediaProcessorTrait};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    project_root: PathBuf,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig, project_root: PathBuf) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            project_root,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!("Burning subtitles from {} into {} -> {}",
              subtitle_path.display(), video_path.display(), output_path.display());

        let subtitle_rel = project_relative(subtitle_path, &self.project_root)?;
        let fonts_dir = self.project_root.join(&self.config.fonts_dir);
        let fonts_rel = fonts_dir.is_dir().then(|| self.config.fonts_dir.replace('\\', "/"));

        let command = self.command_builder.burn_subtitles(
            video_path,
            &subtitle_rel,
            fonts_rel.as_deref(),
            output_path,
            &self.project_root,
            &self.config.subtitle_options,
        );

        command.execute().await.map_err(|e| match e {
            SubburnError::Media(message) => SubburnError::CompositionFailed(message),
            other => other,
        })?;

        info!("Subtitle burn completed successfully");
        Ok(())
    }

    async fn probe_dimensions(&self, video_path: &Path) -> Result<Option<(u32, u32)>> {
        let stdout = self.command_builder.probe_dimensions(video_path).execute().await?;
        let dimensions = parse_probe_output(&stdout)?;
        debug!("Probed {}: {:?}", video_path.display(), dimensions);
        Ok(dimensions)
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| SubburnError::Media(format!("Media processor not available: {}", e)))?;
        info!("Media processor is available");
        Ok(())
    }
}

/// Extract the first stream's size from ffprobe JSON. Zero sizes are unknown.
pub fn parse_probe_output(stdout: &[u8]) -> Result<Option<(u32, u32)>> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)?;
    Ok(probe.streams.into_iter().next().and_then(|s| match (s.width, s.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
        _ => None,
    }))
}

/// `path` relative to `root` with forward slashes, for the subtitles filter
pub fn project_relative(path: &Path, root: &Path) -> Result<String> {
    let outside = || SubburnError::PathOutsideProject {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };
    let path_abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let root_abs = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let relative = path_abs.strip_prefix(&root_abs).map_err(|_| outside())?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{"programs":[],"streams":[{"width":1920,"height":1080}]}"#;
        assert_eq!(parse_probe_output(json).unwrap(), Some((1920, 1080)));

        assert_eq!(parse_probe_output(br#"{"streams":[]}"#).unwrap(), None);
        assert_eq!(parse_probe_output(br#"{}"#).unwrap(), None);
        assert_eq!(parse_probe_output(br#"{"streams":[{"width":0,"height":0}]}"#).unwrap(), None);
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn test_project_relative() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("clips").create_dir_all().unwrap();
        let ass = root.child("clips").child("talk.ass");
        ass.write_str("[Script Info]\n").unwrap();

        assert_eq!(project_relative(ass.path(), root.path()).unwrap(), "clips/talk.ass");
    }

    #[test]
    fn test_project_relative_outside() {
        let root = assert_fs::TempDir::new().unwrap();
        let elsewhere = assert_fs::TempDir::new().unwrap();
        let ass = elsewhere.child("talk.ass");
        ass.write_str("").unwrap();

        let result = project_relative(ass.path(), root.path());
        assert!(matches!(result, Err(SubburnError::PathOutsideProject { .. })));
    }
}
