//! Subburn - Styled Subtitle Burning Workflow
//!
//! Transcribes a video with whisper, decorates the transcript with emoji,
//! converts it to an Advanced SubStation Alpha styling file and burns that
//! into the video with ffmpeg.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod transcribe;
pub mod timestamp;
pub mod subtitle;
pub mod emoji;
pub mod ass;
pub mod fonts;
pub mod media;
pub mod error;
