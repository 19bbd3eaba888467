use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};
use super::{find_srt_output, TranscriberTrait};

/// Transcriber backed by the OpenAI Whisper command line tool
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, video_path: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(video_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_format").arg("srt")
            .arg("--output_dir").arg(output_dir)
            .arg("--language").arg(&self.config.language)
            .args(&self.config.extra_args);
        cmd
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCliTranscriber {
    async fn transcribe(&self, video_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let name = video_path.display().to_string();
        tokio::fs::create_dir_all(output_dir).await?;

        info!("Running whisper ({}) on {}", self.config.model, name);
        let mut cmd = self.build_command(video_path, output_dir);
        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd.output().await.map_err(|e| {
            SubburnError::TranscriptionFailed(format!("Failed to execute {}: {}", self.config.binary_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::TranscriptionFailed(format!(
                "whisper failed for {}: {}",
                name,
                stderr.trim()
            )));
        }

        find_srt_output(video_path, output_dir)?.ok_or_else(|| {
            SubburnError::TranscriptionFailed(format!("whisper did not produce an SRT for {}", name))
        })
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--help")
            .output()
            .await
            .map_err(|e| SubburnError::TranscriptionFailed(format!("whisper command not found: {}", e)))?;

        if output.status.success() {
            info!("Whisper command line tool is available");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SubburnError::TranscriptionFailed(format!(
                "Whisper not available. Install with: pip install openai-whisper\nError: {}",
                stderr
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let transcriber = WhisperCliTranscriber::new(TranscriberConfig {
            extra_args: vec!["--fp16".to_string(), "False".to_string()],
            ..TranscriberConfig::default()
        });
        let cmd = transcriber.build_command(Path::new("clip.mp4"), Path::new("out"));
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "whisper");
        let args: Vec<String> = std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "clip.mp4", "--model", "small", "--output_format", "srt", "--output_dir", "out",
                "--language", "en", "--fp16", "False",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = WhisperCliTranscriber::new(TranscriberConfig {
            binary_path: dir.path().join("no-such-whisper").display().to_string(),
            ..TranscriberConfig::default()
        });
        let result = transcriber.transcribe(Path::new("clip.mp4"), dir.path()).await;
        assert!(matches!(result, Err(SubburnError::TranscriptionFailed(_))));
    }
}
