use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubburnError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    pub working_dir: Option<PathBuf>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            working_dir: None,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Run the command from `dir`
    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Execute the command and return its standard output
    pub async fn execute(&self) -> Result<Vec<u8>> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await
            .map_err(|e| SubburnError::Media(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Escape a value for use inside an ffmpeg filter graph argument
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if " ':,[]\\".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Builder for the ffmpeg and ffprobe invocations used by the workflow
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build the subtitle burn command.
    ///
    /// `subtitle_rel` and `fonts_rel` are relative to `project_root`, which
    /// becomes the working directory.
    pub fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_rel: &str,
        fonts_rel: Option<&str>,
        output_path: &Path,
        project_root: &Path,
        additional_options: &[String],
    ) -> MediaCommand {
        let mut filter = format!("subtitles={}", escape_filter_value(subtitle_rel));
        if let Some(fonts) = fonts_rel {
            filter.push_str(&format!(":fontsdir={}", escape_filter_value(fonts)));
        }

        MediaCommand::new(&self.binary_path, "Subtitle burn")
            .current_dir(project_root)
            .overwrite()
            .input(video_path)
            .video_filter(filter)
            .copy_audio()
            .args(additional_options.iter().cloned())
            .output(output_path)
    }

    /// Build the frame size probe command (JSON output)
    pub fn probe_dimensions(&self, video_path: &Path) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Frame size probe")
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height", "-of", "json"])
            .output(video_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("subs/clip.ass"), "subs/clip.ass");
        assert_eq!(escape_filter_value("my clip's [1],a:b"), "my\\ clip\\'s\\ \\[1\\]\\,a\\:b");
        assert_eq!(escape_filter_value("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_burn_command() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.burn_subtitles(
            Path::new("/proj/clips/a.mp4"),
            "clips/a emoji.ass",
            Some("fonts"),
            Path::new("/proj/clips/a_subtitled.mp4"),
            Path::new("/proj"),
            &["-crf".to_string(), "20".to_string()],
        );
        assert_eq!(cmd.working_dir.as_deref(), Some(Path::new("/proj")));
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "/proj/clips/a.mp4", "-vf", "subtitles=clips/a\\ emoji.ass:fontsdir=fonts",
                "-c:a", "copy", "-crf", "20", "/proj/clips/a_subtitled.mp4",
            ]
        );
    }

    #[test]
    fn test_probe_command() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.probe_dimensions(Path::new("a.mp4"));
        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(cmd.args.last().map(String::as_str), Some("a.mp4"));
    }
}
