use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::Stage;

#[derive(Error, Debug)]
pub enum SubburnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("No subtitle entries found in {}", .0.display())]
    EmptyTranscript(PathBuf),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Composition failed: {0}")]
    CompositionFailed(String),

    #[error("{} is not inside the project directory {}", path.display(), root.display())]
    PathOutsideProject { path: PathBuf, root: PathBuf },

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{stage} stage failed for {video}: {source}")]
    Stage {
        video: String,
        stage: Stage,
        #[source]
        source: Box<SubburnError>,
    },
}

impl SubburnError {
    /// Attach the video identifier and stage name to a stage failure
    pub fn in_stage(self, video: impl Into<String>, stage: Stage) -> Self {
        SubburnError::Stage {
            video: video.into(),
            stage,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SubburnError>;
