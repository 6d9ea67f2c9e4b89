use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType, DEFAULT_EXPORT_NAME, DEFAULT_RENDERED_NAME};
use crate::providers::backend::HttpBackend;
use crate::providers::retry::{RetryPolicy, RetryingBackend};
use crate::providers::{SubtitleBackend, VideoUpload};
use crate::resolver::{ActiveChange, ActiveEntryIndex, PlaybackCursor};
use crate::session::EditorSession;
use crate::style::StyleOptions;
use crate::subtitle_processor::SubtitleEntry;
use crate::timeline::TimelineStore;
use crate::timestamp;

// @module: Application controller for subtitle workflows

/// Suffix of a `list` line whose entry ends before it starts
pub const END_BEFORE_START_MARK: &str = "  (ends before start)";

/// Main application controller for subtitle generation and burn-in
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Transcription and burn-in backend
    backend: Arc<dyn SubtitleBackend>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a controller talking to the configured HTTP backend
    pub fn with_config(config: Config) -> Result<Self> {
        let http = HttpBackend::from_config(&config.backend)
            .context("Failed to create backend client")?;
        let backend = RetryingBackend::new(http, RetryPolicy::from_config(&config.backend));

        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    // @method: Create a controller around any backend
    pub fn with_backend(config: Config, backend: Arc<dyn SubtitleBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate subtitles for a video and save them as SRT.
    ///
    /// Without `output` the file lands next to the video as `subtitles.srt`.
    pub async fn transcribe(&self, video_file: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<PathBuf> {
        let output_path = output.unwrap_or_else(|| Self::sibling_path(video_file, DEFAULT_EXPORT_NAME));
        Self::check_overwrite(&output_path, force_overwrite)?;
        Self::check_video(video_file)?;

        let mut session = self.new_session();
        session.select_video(VideoUpload::from_path(video_file).await?);

        let spinner = Self::spinner(crate::session::MSG_GENERATING);
        let result = session.transcribe(self.backend.as_ref()).await;
        Self::finish_spinner(&spinner, session.status().message());
        let count = result?;

        let srt = session.export_srt()?;
        FileManager::write_to_file(&output_path, &srt)?;

        info!("Saved {} subtitles to {}", count, output_path.display());
        Ok(output_path)
    }

    /// Burn an SRT file into a video and save the rendered result.
    ///
    /// Without `output` the video lands next to the source as `subtitled.mp4`.
    pub async fn burn(
        &self,
        video_file: &Path,
        subtitle_file: &Path,
        output: Option<PathBuf>,
        style: StyleOptions,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let output_path = output.unwrap_or_else(|| Self::sibling_path(video_file, DEFAULT_RENDERED_NAME));
        Self::check_overwrite(&output_path, force_overwrite)?;
        Self::check_video(video_file)?;
        style.validate().context("Invalid style options")?;

        let mut session = EditorSession::new(TimelineStore::new(), style);
        session.import_srt(&Self::read_subtitles(subtitle_file)?)?;
        session.select_video(VideoUpload::from_path(video_file).await?);

        let spinner = Self::spinner(crate::session::MSG_BURNING);
        let result = session.burn(self.backend.as_ref()).await;
        Self::finish_spinner(&spinner, session.status().message());
        let rendered = result?;

        FileManager::write_bytes_atomic(&output_path, &rendered)?;

        info!("Saved rendered video to {}", output_path.display());
        Ok(output_path)
    }

    /// Rewrite an SRT file in canonical form: start-sorted, renumbered from 1.
    ///
    /// Returns the canonical text; it is written to `output` when given.
    pub fn normalize(&self, subtitle_file: &Path, output: Option<&Path>, force_overwrite: bool) -> Result<String> {
        let timeline = self.load_timeline(subtitle_file)?;
        let srt = timeline.to_srt()?;

        if let Some(output_path) = output {
            // Rewriting the input in place is always allowed
            if output_path != subtitle_file {
                Self::check_overwrite(output_path, force_overwrite)?;
            }
            FileManager::write_to_file(output_path, &srt)?;
            info!("Wrote {} normalized subtitles to {}", timeline.len(), output_path.display());
        }

        Ok(srt)
    }

    /// One display line per entry of the start-sorted view.
    ///
    /// Entries that end before they start are flagged with `END_BEFORE_START_MARK`.
    pub fn list(&self, subtitle_file: &Path) -> Result<Vec<String>> {
        let timeline = self.load_timeline(subtitle_file)?;

        timeline
            .view()
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<String> {
                let mut line = format!(
                    "{:>4}  {} --> {}  [{}]  {}",
                    i + 1,
                    entry.format_start_time()?,
                    entry.format_end_time()?,
                    entry.id,
                    entry.text.replace('\n', " | ")
                );
                if !entry.is_well_formed() {
                    warn!("Entry {} ends before it starts", entry.id);
                    line.push_str(END_BEFORE_START_MARK);
                }
                Ok(line)
            })
            .collect()
    }

    /// The entry shown at `time` (seconds or an SRT timestamp)
    pub fn entry_at(&self, subtitle_file: &Path, time: &str) -> Result<Option<SubtitleEntry>> {
        let seconds = parse_time_arg(time)?;
        let timeline = self.load_timeline(subtitle_file)?;
        Ok(timeline.active_at(seconds).cloned())
    }

    /// Simulate playback sampled every `step` seconds, reporting each change of
    /// the displayed entry as a `M:SS` stamped line
    pub fn preview(&self, subtitle_file: &Path, step: f64, until: Option<f64>) -> Result<Vec<String>> {
        if !step.is_finite() || step <= 0.0 {
            return Err(anyhow!("Preview step must be a positive number of seconds, got {}", step));
        }
        if let Some(until) = until {
            if !until.is_finite() || until < 0.0 {
                return Err(anyhow!("Preview end must be a non-negative number of seconds, got {}", until));
            }
        }

        let timeline = self.load_timeline(subtitle_file)?;
        let index = ActiveEntryIndex::new(timeline.view());
        let end = until.unwrap_or_else(|| {
            timeline.view().iter().map(|entry| entry.end).fold(0.0, f64::max)
        });

        let mut cursor = PlaybackCursor::new();
        let mut lines = Vec::new();
        let mut tick: u64 = 0;
        loop {
            // Multiply instead of accumulating to keep samples on the grid
            let time = tick as f64 * step;
            if time > end {
                break;
            }

            match cursor.advance(&index, time) {
                Some(ActiveChange::Show(entry)) => {
                    lines.push(format!("{}  {}", timestamp::format_clock(time), entry.text.replace('\n', " | ")));
                }
                Some(ActiveChange::Hide) => {
                    lines.push(format!("{}  -", timestamp::format_clock(time)));
                }
                None => {}
            }
            tick += 1;
        }

        Ok(lines)
    }

    fn new_session(&self) -> EditorSession {
        EditorSession::new(TimelineStore::new(), self.config.style.clone())
    }

    fn load_timeline(&self, subtitle_file: &Path) -> Result<TimelineStore> {
        let mut timeline = TimelineStore::new();
        timeline
            .load_srt(&Self::read_subtitles(subtitle_file)?)
            .with_context(|| format!("Failed to parse subtitle file: {}", subtitle_file.display()))?;
        Ok(timeline)
    }

    fn read_subtitles(subtitle_file: &Path) -> Result<String> {
        match FileManager::detect_file_type(subtitle_file)? {
            FileType::Subtitle => {}
            FileType::Video => {
                return Err(anyhow!("Expected an SRT file but got a video: {}", subtitle_file.display()));
            }
            FileType::Unknown => {
                warn!("{} does not look like an SRT file, trying anyway", subtitle_file.display());
            }
        }
        FileManager::read_to_string(subtitle_file)
    }

    fn check_video(video_file: &Path) -> Result<()> {
        if !FileManager::file_exists(video_file) {
            return Err(anyhow!("Input file does not exist: {:?}", video_file));
        }
        if FileManager::detect_file_type(video_file)? == FileType::Subtitle {
            return Err(anyhow!("Expected a video but got a subtitle file: {}", video_file.display()));
        }
        Ok(())
    }

    fn check_overwrite(output_path: &Path, force_overwrite: bool) -> Result<()> {
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {} (use -f to force overwrite)",
                output_path.display()
            ));
        }
        Ok(())
    }

    fn sibling_path(input_file: &Path, file_name: &str) -> PathBuf {
        input_file.parent().unwrap_or(Path::new("")).join(file_name)
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn finish_spinner(spinner: &ProgressBar, message: Option<&str>) {
        match message {
            Some(message) => spinner.finish_with_message(message.to_string()),
            None => spinner.finish_and_clear(),
        }
    }
}

/// Parse a playback time given as plain seconds (`12.5`) or an SRT timestamp
pub fn parse_time_arg(value: &str) -> Result<f64> {
    let value = value.trim();
    let seconds = if value.contains(':') {
        timestamp::decode(value)?
    } else {
        value
            .parse::<f64>()
            .with_context(|| format!("Invalid time '{}', expected seconds or HH:MM:SS,mmm", value))?
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(anyhow!("Time must be a non-negative number of seconds, got {}", value));
    }
    Ok(seconds)
}
