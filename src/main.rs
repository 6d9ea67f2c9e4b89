// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subtitler::app_config::{self, Config};
use subtitler::app_controller::Controller;
use subtitler::style::{StylePatch, SubtitlePosition};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SubtitlePosition to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPosition {
    Bottom,
    Top,
    Left,
    Right,
    Center,
}

impl From<CliPosition> for SubtitlePosition {
    fn from(cli_position: CliPosition) -> Self {
        match cli_position {
            CliPosition::Bottom => SubtitlePosition::Bottom,
            CliPosition::Top => SubtitlePosition::Top,
            CliPosition::Left => SubtitlePosition::Left,
            CliPosition::Right => SubtitlePosition::Right,
            CliPosition::Center => SubtitlePosition::Center,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate subtitles for a video through the backend
    Transcribe {
        /// Video file to transcribe
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Where to write the SRT file (default: subtitles.srt next to the video)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Burn subtitles into a video through the backend
    Burn {
        /// Source video file
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Subtitles to burn in
        #[arg(value_name = "SRT")]
        subtitles: PathBuf,

        /// Where to write the rendered video (default: subtitled.mp4 next to the video)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Rewrite an SRT file sorted by start time and renumbered
    Normalize {
        /// SRT file to normalize
        #[arg(value_name = "SRT")]
        subtitles: PathBuf,

        /// Where to write the result (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the input file
        #[arg(short, long, conflicts_with = "output")]
        in_place: bool,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Print the subtitles sorted by start time
    List {
        /// SRT file to list
        #[arg(value_name = "SRT")]
        subtitles: PathBuf,
    },

    /// Print the subtitle shown at a playback time
    At {
        /// SRT file to search
        #[arg(value_name = "SRT")]
        subtitles: PathBuf,

        /// Playback time in seconds (12.5) or as a timestamp (00:00:12,500)
        #[arg(value_name = "TIME", allow_hyphen_values = true)]
        time: String,
    },

    /// Simulate playback and print every change of the displayed subtitle
    Preview {
        /// SRT file to play
        #[arg(value_name = "SRT")]
        subtitles: PathBuf,

        /// Sampling interval in seconds
        #[arg(short, long, default_value_t = 0.25)]
        step: f64,

        /// Stop playback at this many seconds (default: end of the last subtitle)
        #[arg(short, long)]
        until: Option<f64>,
    },

    /// Generate shell completions for subtitler
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Style overrides on top of the configured defaults
#[derive(Args, Debug)]
struct StyleArgs {
    /// Text position on the frame
    #[arg(long, value_enum)]
    position: Option<CliPosition>,

    /// Text color as hex (#RRGGBB)
    #[arg(long)]
    color: Option<String>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Opacity of the box behind the text (0.0 to 1.0)
    #[arg(long)]
    bg_opacity: Option<f64>,
}

impl From<StyleArgs> for StylePatch {
    fn from(args: StyleArgs) -> Self {
        StylePatch {
            position: args.position.map(Into::into),
            color: args.color,
            font_size: args.font_size,
            bg_opacity: args.bg_opacity,
        }
    }
}

/// Subtitler - AI subtitle generation and burn-in
///
/// Generates subtitles for a video through a transcription backend, lets
/// you inspect and normalize SRT files, and burns subtitles into the video.
#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(version)]
#[command(about = "AI-powered subtitle generation and burn-in tool")]
#[command(long_about = "Subtitler generates subtitles for video files through a backend service and burns them into the video.

EXAMPLES:
    subtitler transcribe movie.mp4                    # Write subtitles.srt next to the video
    subtitler burn movie.mp4 subtitles.srt            # Write subtitled.mp4 next to the video
    subtitler burn movie.mp4 subs.srt --position top --font-size 32
    subtitler normalize -i subs.srt                   # Sort and renumber in place
    subtitler list subs.srt                           # Show entries with timestamps
    subtitler at subs.srt 00:01:02,500                # Subtitle shown at 1:02.5
    subtitler preview subs.srt --step 0.5             # Simulated playback
    subtitler completions bash > subtitler.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Backend base URL, overrides the config
    #[arg(long, global = true, env = "SUBTITLER_ENDPOINT")]
    endpoint: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subtitler", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command).await
}

// Load or create configuration, then apply CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(&cli.config_path)?;
    if created {
        warn!("Config file not found at '{}', creating default config.", cli.config_path);
    }

    if let Some(endpoint) = &cli.endpoint {
        config.backend.endpoint = endpoint.clone();
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Transcribe { video, output, force_overwrite } => {
            let output_path = controller.transcribe(&video, output, force_overwrite).await?;
            info!("Success: {:?}", output_path);
        }
        Commands::Burn { video, subtitles, output, force_overwrite, style } => {
            let style = controller.config().style.merged(style.into());
            let output_path = controller.burn(&video, &subtitles, output, style, force_overwrite).await?;
            info!("Success: {:?}", output_path);
        }
        Commands::Normalize { subtitles, output, in_place, force_overwrite } => {
            let target = if in_place { Some(subtitles.clone()) } else { output };
            let srt = controller.normalize(&subtitles, target.as_deref(), force_overwrite)?;
            if target.is_none() {
                println!("{}", srt);
            }
        }
        Commands::List { subtitles } => {
            let lines = controller.list(&subtitles)?;
            if lines.is_empty() {
                warn!("No subtitles found in {:?}", subtitles);
            }
            for line in lines {
                println!("{}", line);
            }
        }
        Commands::At { subtitles, time } => {
            match controller.entry_at(&subtitles, &time)? {
                Some(entry) => {
                    println!("{} --> {}", entry.format_start_time()?, entry.format_end_time()?);
                    println!("{}", entry.text);
                }
                None => info!("No subtitle is shown at {}", time),
            }
        }
        Commands::Preview { subtitles, step, until } => {
            for line in controller.preview(&subtitles, step, until)? {
                println!("{}", line);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
