use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::ass::AssSynthesizer;
use crate::config::Config;
use crate::emoji::{emoji_output_path, inject_emojis, EmojiTriggers};
use crate::error::{Result, SubburnError};
use crate::fonts::{FontResolver, FsFontResolver};
use crate::media::{burned_output_path, is_burned_output, MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::read_srt;
use crate::transcribe::{expected_srt_path, TranscriberFactory, TranscriberTrait};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Annotate,
    Synthesize,
    Composite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Transcribe => "transcribe",
            Stage::Annotate => "annotate",
            Stage::Synthesize => "synthesize",
            Stage::Composite => "composite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Run,
    Reuse,
}

/// Whether a stage must run given the state of its output
pub fn stage_action(output_exists: bool, force: bool) -> StageAction {
    if output_exists && !force {
        StageAction::Reuse
    } else {
        StageAction::Run
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage did its work
    Ran,
    /// An existing output was reused
    Reused,
    /// The stage is disabled for this run
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Artifacts of one successful run
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub source_video: PathBuf,
    pub output_video: PathBuf,
    /// Transcript the styling file was built from (annotated when triggers fired)
    pub srt_path: PathBuf,
    pub ass_path: PathBuf,
    pub stages: Vec<StageReport>,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Redo every stage even when its output exists
    pub force: bool,
    pub enable_emoji: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force: false,
            enable_emoji: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<ProcessResult>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Workflow {
    config: Config,
    triggers: EmojiTriggers,
    transcriber: Box<dyn TranscriberTrait>,
    media: Box<dyn MediaProcessorTrait>,
    fonts: Box<dyn FontResolver>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let project_root = config.media.resolve_project_root()?;
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone(), project_root.clone());
        let fonts = Box::new(FsFontResolver::new(project_root.join(&config.media.fonts_dir)));

        Self::with_collaborators(config, transcriber, media, fonts)
    }

    /// Build a workflow around explicit collaborators
    pub fn with_collaborators(
        config: Config,
        transcriber: Box<dyn TranscriberTrait>,
        media: Box<dyn MediaProcessorTrait>,
        fonts: Box<dyn FontResolver>,
    ) -> Result<Self> {
        config.style.validate()?;
        let triggers = EmojiTriggers::from_rules(&config.emoji.triggers)?;

        Ok(Self {
            config,
            triggers,
            transcriber,
            media,
            fonts,
        })
    }

    /// Check that the external tools can be executed
    pub async fn check_dependencies(&self) -> Result<()> {
        self.media.check_availability().await?;
        self.transcriber.check_availability().await
    }

    /// Run Transcribe, Annotate, Synthesize and Composite for one video
    pub async fn process_video<P: AsRef<Path>>(&self, video_path: P, options: RunOptions) -> Result<ProcessResult> {
        let video_path = video_path.as_ref();
        if !video_path.exists() {
            return Err(SubburnError::FileNotFound(video_path.display().to_string()));
        }
        let video = tokio::fs::canonicalize(video_path).await?;
        let name = video.display().to_string();
        info!("Processing video: {}", name);

        let mut stages = Vec::with_capacity(4);

        let (srt_path, outcome) = self
            .transcribe_stage(&video, options.force)
            .await
            .map_err(|e| e.in_stage(&name, Stage::Transcribe))?;
        stages.push(StageReport { stage: Stage::Transcribe, outcome });

        let (srt_path, outcome) = self.annotate_stage(&srt_path, options);
        stages.push(StageReport { stage: Stage::Annotate, outcome });

        let (ass_path, outcome) = self
            .synthesize_stage(&video, &srt_path, options.force)
            .await
            .map_err(|e| e.in_stage(&name, Stage::Synthesize))?;
        stages.push(StageReport { stage: Stage::Synthesize, outcome });

        let (output_video, outcome) = self
            .composite_stage(&video, &ass_path, options.force)
            .await
            .map_err(|e| e.in_stage(&name, Stage::Composite))?;
        stages.push(StageReport { stage: Stage::Composite, outcome });

        info!("Finished {} -> {}", name, output_video.display());
        Ok(ProcessResult {
            source_video: video,
            output_video,
            srt_path,
            ass_path,
            stages,
        })
    }

    async fn transcribe_stage(&self, video: &Path, force: bool) -> Result<(PathBuf, StageOutcome)> {
        let expected = expected_srt_path(video)?;
        if stage_action(expected.exists(), force) == StageAction::Reuse {
            info!("Reusing existing SRT {}", expected.display());
            return Ok((expected, StageOutcome::Reused));
        }

        let output_dir = video.parent().unwrap_or_else(|| Path::new("."));
        let srt = self.transcriber.transcribe(video, output_dir).await?;
        Ok((srt, StageOutcome::Ran))
    }

    /// Best effort: any failure falls back to the unannotated transcript
    fn annotate_stage(&self, srt: &Path, options: RunOptions) -> (PathBuf, StageOutcome) {
        if !(options.enable_emoji && self.config.emoji.enabled) {
            return (srt.to_path_buf(), StageOutcome::Skipped);
        }

        let annotated = emoji_output_path(srt);
        if stage_action(annotated.exists(), options.force) == StageAction::Reuse {
            info!("Reusing existing annotated SRT {}", annotated.display());
            return (annotated, StageOutcome::Reused);
        }

        match inject_emojis(srt, true, &self.triggers) {
            Ok(path) => (path, StageOutcome::Ran),
            Err(e) => {
                warn!("Emoji annotation failed for {}: {}", srt.display(), e);
                (srt.to_path_buf(), StageOutcome::Ran)
            }
        }
    }

    async fn synthesize_stage(&self, video: &Path, transcript: &Path, force: bool) -> Result<(PathBuf, StageOutcome)> {
        let ass_path = transcript.with_extension("ass");
        if stage_action(ass_path.exists(), force) == StageAction::Reuse {
            info!("Reusing existing ASS {}", ass_path.display());
            return Ok((ass_path, StageOutcome::Reused));
        }

        let canvas = match self.media.probe_dimensions(video).await {
            Ok(canvas) => canvas,
            Err(e) => {
                warn!("Could not probe frame size of {}: {}", video.display(), e);
                None
            }
        };
        if canvas.is_none() {
            info!(
                "Frame size unknown, using default canvas {}x{}",
                self.config.style.play_res_x, self.config.style.play_res_y
            );
        }

        self.synthesize(transcript, &ass_path, canvas)?;
        Ok((ass_path, StageOutcome::Ran))
    }

    async fn composite_stage(&self, video: &Path, ass: &Path, force: bool) -> Result<(PathBuf, StageOutcome)> {
        let output = burned_output_path(video, &self.config.media)?;
        if stage_action(output.exists(), force) == StageAction::Reuse {
            info!("Skipping burn for {} (output exists)", output.display());
            return Ok((output, StageOutcome::Reused));
        }

        self.media.burn_subtitles(video, ass, &output).await?;
        Ok((output, StageOutcome::Ran))
    }

    /// Convert a transcript into a styling file with the resolved emoji font
    pub fn synthesize(&self, transcript: &Path, ass_path: &Path, canvas: Option<(u32, u32)>) -> Result<()> {
        let font = self.fonts.resolve(self.config.style.emoji_font.as_deref());
        match &font.file {
            Some(file) => debug!("Emoji override '{}' backed by {}", font.name, file.display()),
            None => debug!("Emoji override '{}' left to the renderer's font lookup", font.name),
        }
        let style = self.config.style.with_emoji_font(Some(font.name));

        let blocks = read_srt(transcript)?;
        AssSynthesizer::new(&style, self.triggers.glyphs()).write(&blocks, canvas, transcript, ass_path)
    }

    /// Annotate a transcript with the configured triggers
    pub fn annotate(&self, srt: &Path) -> Result<PathBuf> {
        inject_emojis(srt, self.config.emoji.enabled, &self.triggers)
    }

    /// Burn an existing styling file into a video, replacing any previous output
    pub async fn burn(&self, video: &Path, ass: &Path) -> Result<PathBuf> {
        if !video.exists() {
            return Err(SubburnError::FileNotFound(video.display().to_string()));
        }
        // ffmpeg runs from the project root
        let video = tokio::fs::canonicalize(video).await?;
        let output = burned_output_path(&video, &self.config.media)?;
        self.media.burn_subtitles(&video, ass, &output).await?;
        Ok(output)
    }

    /// Process every source video under `input_dir`, at most `jobs` at a time.
    ///
    /// A failing video is recorded in the summary; its siblings keep going.
    pub async fn process_directory<P: AsRef<Path>>(
        self: &Arc<Self>,
        input_dir: P,
        options: RunOptions,
        jobs: usize,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubburnError::Config("Input path is not a directory".to_string()));
        }

        let found = find_videos(input_dir, &self.config);
        info!("Found {} video files to process", found.len());

        let mut summary = BatchSummary::default();
        let (videos, collisions) = partition_by_output(found, &self.config);
        for (video, error) in collisions {
            warn!("Not processing {}: {}", video.display(), error);
            summary.failed.push((video, error));
        }

        let progress = ProgressBar::new(videos.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
        let mut tasks = JoinSet::new();
        let mut pending: BTreeSet<PathBuf> = videos.iter().cloned().collect();

        for video in videos {
            let workflow = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let span = info_span!("job", id = %Uuid::new_v4(), video = %video.display());

            tasks.spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await;
                    let result = workflow.process_video(&video, options).await;
                    (video, result)
                }
                .instrument(span),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            progress.inc(1);
            match joined {
                Ok((video, Ok(result))) => {
                    info!("Successfully processed: {}", video.display());
                    pending.remove(&video);
                    summary.succeeded.push(result);
                }
                Ok((video, Err(e))) => {
                    warn!("Failed to process {}: {}", video.display(), e);
                    pending.remove(&video);
                    summary.failed.push((video, e.to_string()));
                }
                Err(e) => warn!("Batch job panicked or was cancelled: {}", e),
            }
        }
        progress.finish_with_message("done");

        // Jobs that panicked or were cancelled never reported back
        for video in pending {
            summary.failed.push((video, "job panicked or was cancelled before finishing".to_string()));
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}

/// Split `videos` so that no two sources share a burned output path.
///
/// The first source in the given order keeps the output; every later one is
/// returned with the reason it was left out.
pub fn partition_by_output(videos: Vec<PathBuf>, config: &Config) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut owners: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut accepted = Vec::with_capacity(videos.len());
    let mut rejected = Vec::new();

    for video in videos {
        let output = match burned_output_path(&video, &config.media) {
            Ok(output) => output,
            Err(e) => {
                rejected.push((video, e.to_string()));
                continue;
            }
        };
        match owners.get(&output) {
            Some(owner) => {
                let reason = format!(
                    "output path {} collides with {}",
                    output.display(),
                    owner.display()
                );
                rejected.push((video, reason));
            }
            None => {
                owners.insert(output, video.clone());
                accepted.push(video);
            }
        }
    }
    (accepted, rejected)
}

/// Source videos under `dir`, excluding files this tool produced
pub fn find_videos(dir: &Path, config: &Config) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .filter(|path| !is_burned_output(path, &config.media))
        .collect();
    videos.sort();
    videos
}
