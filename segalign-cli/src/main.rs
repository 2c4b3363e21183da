//! segalign CLI Tool
//!
//! Command-line interface for turning aligner output into control files and
//! annotation documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use segalign_annotate::{writer, AnnotateConfig, AnnotationFormat, AnnotationWriter, TimelineBuilder};
use segalign_ctl::ReconcileConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "segalign")]
#[command(about = "Convert forced-alignment output into control files and annotation documents")]
#[command(version)]
struct Cli {
    /// TOML file with [ctl] and [annotate] settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile detected endpoints with manual boundaries into a control file
    Ctl {
        /// Recording directory containing `boundaries` and `ep`
        dir: PathBuf,

        /// Tolerance in frames between a detected end and a manual boundary
        #[arg(long)]
        epsilon: Option<u64>,

        /// Recognizer frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Output control file path (defaults to `<DIR>/ctl`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build word and phone tiers and write an annotation document
    Annotate {
        /// Recording directory containing `ctl`, `insent`, `wdseg/` and `phseg/`
        dir: PathBuf,

        /// Document format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Recognizer frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Audio file name referenced by the document
        #[arg(long)]
        media: Option<String>,

        /// Participant recorded on every tier
        #[arg(long)]
        participant: Option<String>,

        /// Output document path (defaults to `<DIR>/annotation.<ext>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Eaf,
    #[value(name = "textgrid")]
    TextGrid,
}

impl From<FormatArg> for AnnotationFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Eaf => AnnotationFormat::Eaf,
            FormatArg::TextGrid => AnnotationFormat::TextGrid,
        }
    }
}

/// Settings file contents; anything left out keeps its default
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    ctl: ReconcileConfig,
    annotate: AnnotateConfig,
}

impl Settings {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ctl {
            dir,
            epsilon,
            fps,
            output,
        } => {
            let mut config = settings.ctl;
            if let Some(epsilon) = epsilon {
                config.epsilon_frames = epsilon;
            }
            if let Some(fps) = fps {
                config.frames_per_second = fps;
            }
            make_control_file(&dir, output, &config)?
        }

        Commands::Annotate {
            dir,
            format,
            fps,
            media,
            participant,
            output,
        } => {
            let mut config = settings.annotate;
            if let Some(format) = format {
                config.format = format.into();
            }
            if let Some(fps) = fps {
                config.frames_per_second = fps;
            }
            if let Some(media) = media {
                config.media_file = media;
            }
            if let Some(participant) = participant {
                config.participant = participant;
            }
            make_annotation(&dir, output, &config)?
        }
    }

    Ok(())
}

fn make_control_file(dir: &Path, output: Option<PathBuf>, config: &ReconcileConfig) -> Result<()> {
    info!("Reconciling boundaries in {}", dir.display());

    let entries = segalign_ctl::reconcile_dir(dir, config).context("Failed to reconcile boundaries")?;

    let output = output.unwrap_or_else(|| dir.join(segalign_core::CONTROL_FILE));
    segalign_ctl::write_control_file(&output, &entries)
        .with_context(|| format!("Failed to write control file {}", output.display()))?;

    println!("Wrote {} utterances to {}", entries.len(), output.display());
    Ok(())
}

fn make_annotation(dir: &Path, output: Option<PathBuf>, config: &AnnotateConfig) -> Result<()> {
    info!("Building timelines for {}", dir.display());

    let alignment = TimelineBuilder::new(dir, config.clone())
        .build()
        .context("Failed to build timelines")?;

    let output = output.unwrap_or_else(|| dir.join(config.format.file_name()));
    writer::for_config(config)
        .write_file(&alignment, &output)
        .with_context(|| format!("Failed to write annotation document {}", output.display()))?;

    println!(
        "Wrote {} words and {} phones to {}",
        alignment.words.labeled().count(),
        alignment.phones.labeled().count(),
        output.display()
    );
    Ok(())
}
