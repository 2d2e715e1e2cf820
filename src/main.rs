#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};

use cutdraft::app_config::{self, Config};
use cutdraft::{Document, ImportTrackOptions, SubtitleImportOptions, TrackType, parse_time};

/// CLI wrapper for LogLevel to implement ValueEnum
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

fn parse_track_type(value: &str) -> Result<TrackType, String> {
    TrackType::from_name(value).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an empty draft using the configured canvas
    New {
        /// Output draft file
        #[arg(value_name = "OUT")]
        output: PathBuf,
    },

    /// Add the cues of an SRT file as text segments
    ImportSrt {
        /// Draft to edit
        draft: PathBuf,

        /// Subtitle file
        srt: PathBuf,

        /// Track receiving the cues (defaults to the configured one)
        #[arg(long)]
        track: Option<String>,

        /// Shift applied to every cue, e.g. "1.5s" or "2m"
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Write here instead of overwriting the draft
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Copy a track, with its materials, from a template into a draft
    ImportTrack {
        /// Draft holding the track
        template: PathBuf,

        /// Draft receiving the track
        draft: PathBuf,

        /// Track type: video, audio, effect, filter, sticker, text or adjust
        #[arg(long = "type", value_parser = parse_track_type)]
        track_type: TrackType,

        /// Track name in the template
        #[arg(long)]
        name: Option<String>,

        /// Position among the template's tracks of that type, 0 at the bottom
        #[arg(long)]
        index: Option<usize>,

        /// Shift applied to every segment
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,

        /// Rename the imported track
        #[arg(long)]
        new_name: Option<String>,

        /// Write here instead of overwriting the draft
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the text of a segment on an imported text track
    ReplaceText {
        /// Draft to edit
        draft: PathBuf,

        /// Segment index on the track
        #[arg(long)]
        index: usize,

        /// New text; repeat for every slot of a text template
        #[arg(long = "text", required = true)]
        texts: Vec<String>,

        /// Text track name, needed when the draft has several
        #[arg(long)]
        track: Option<String>,

        /// Keep style ranges as they are
        #[arg(long)]
        no_recalc: bool,

        /// Write here instead of overwriting the draft
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stickers, text bubbles and flower-text effects used by a draft
    Inspect {
        draft: PathBuf,
    },

    /// Generate shell completions for cutdraft
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// cutdraft - build and edit video editor drafts
#[derive(Parser, Debug)]
#[command(name = "cutdraft")]
#[command(version)]
#[command(about = "Build and edit video editor drafts")]
#[command(long_about = "cutdraft creates draft projects for a desktop video editor and edits existing ones.

EXAMPLES:
    cutdraft new draft_content.json
    cutdraft import-srt draft_content.json subs.srt --offset 2s
    cutdraft import-track template.json draft_content.json --type text --index 0
    cutdraft replace-text draft_content.json --index 0 --text \"Hello\"
    cutdraft inspect draft_content.json
    cutdraft completions bash > cutdraft.bash

CONFIGURATION:
    Configuration is stored in cutdraft.json by default. If the file does not
    exist, a default one is created.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "cutdraft.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Colored stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Accept everything, the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "cutdraft", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config, cli.log_level.clone())?;
    log::set_max_level(config.log_level.to_level_filter());

    run(cli.command, &config)
}

fn load_config(path: &Path, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if path.exists() {
        Config::from_file(path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        config
    };
    if let Some(level) = log_level {
        config.log_level = level.into();
    }
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn parse_offset(offset: Option<&str>) -> Result<i64> {
    match offset {
        Some(text) => parse_time(text).with_context(|| format!("Invalid offset '{}'", text)),
        None => Ok(0),
    }
}

fn load_draft(path: &Path) -> Result<Document> {
    Document::load_template(path).with_context(|| format!("Failed to load draft {}", path.display()))
}

/// Write to `output` when given, otherwise back to where the draft came from
fn write_draft(document: &Document, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            document
                .dump(path)
                .with_context(|| format!("Failed to write draft {}", path.display()))?;
            info!("Wrote draft to {}", path.display());
        }
        None => document.save().context("Failed to save draft")?,
    }
    Ok(())
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::New { output } => {
            let document = Document::from_config(config);
            write_draft(&document, Some(&output))
        }
        Commands::ImportSrt {
            draft,
            srt,
            track,
            offset,
            output,
        } => {
            let mut document = load_draft(&draft)?;
            let mut options = SubtitleImportOptions::from_config(&config.subtitle);
            options.time_offset = parse_offset(offset.as_deref())?;
            let track_name = track.unwrap_or_else(|| config.subtitle.track_name.clone());
            document
                .import_srt_file(&srt, &track_name, &options)
                .with_context(|| format!("Failed to import {}", srt.display()))?;
            write_draft(&document, output.as_deref())
        }
        Commands::ImportTrack {
            template,
            draft,
            track_type,
            name,
            index,
            offset,
            new_name,
            output,
        } => {
            let source = load_draft(&template)?;
            let handle = source.get_imported_track(track_type, name.as_deref(), index)?;
            let mut document = load_draft(&draft)?;
            let options = ImportTrackOptions {
                offset: parse_offset(offset.as_deref())?,
                new_name,
                relative_index: None,
            };
            document.import_track(&source, handle, options)?;
            write_draft(&document, output.as_deref())
        }
        Commands::ReplaceText {
            draft,
            index,
            texts,
            track,
            no_recalc,
            output,
        } => {
            let mut document = load_draft(&draft)?;
            let handle = document.get_imported_track(TrackType::Text, track.as_deref(), None)?;
            let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
            document.replace_text(handle, index, &texts, !no_recalc)?;
            write_draft(&document, output.as_deref())
        }
        Commands::Inspect { draft } => {
            let document = load_draft(&draft)?;
            print!("{}", document.inspect_materials());
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}
