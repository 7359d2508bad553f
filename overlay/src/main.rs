//! clarity-overlay - renders overlay frames offline and checks documents.
//!
//! Usage:
//!   clarity-overlay render --stack 740=12 --stack 725=1 --out frame.png
//!   clarity-overlay check --document overlay.json
//!
//! Logs go to CLARITY_LOG_PATH when set, stderr otherwise.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use glam::Vec2;
use thiserror::Error;
use tracing_subscriber::filter::EnvFilter;

use clarity_core::persistence::{self, DocumentStore};
use clarity_core::{GameState, LoadReport, ModelError, OverlayState, StackedBuff, StoreError, builtin_catalog};
use clarity_overlay::{Atlas, SinkError, SoftwareSink};
use clarity_types::GeneralOptions;

/// Side of the placeholder sheet used when no icon atlas is given
const BLANK_ATLAS_SIZE: u32 = 16;

#[derive(Parser)]
#[command(version, about = "Clarity buff overlay tools")]
struct Cli {
    /// Options file instead of the platform config location
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Overlay document instead of the one named by the options
    #[arg(long, global = true)]
    document: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose one frame for a stack table and write it as PNG
    Render {
        /// Live stack entry as `id=count`, repeatable
        #[arg(short, long = "stack", value_parser = parse_stack)]
        stacks: Vec<StackedBuff>,
        #[arg(long, default_value_t = 1920)]
        width: u32,
        #[arg(long, default_value_t = 1080)]
        height: u32,
        /// Icon atlas PNG; icons render as flat tinted squares without it
        #[arg(long)]
        icons: Option<PathBuf>,
        /// Number atlas PNG; stack counts are omitted without it
        #[arg(long)]
        numbers: Option<PathBuf>,
        /// Select a layout by name
        #[arg(short, long)]
        layout: Option<String>,
        /// Show every grid regardless of layout
        #[arg(long)]
        ignore_layout: bool,
        #[arg(long)]
        in_combat: bool,
        #[arg(long)]
        competitive: bool,
        /// Buff analyzer filter over names and categories
        #[arg(long)]
        filter: Option<String>,
        /// Mouse position as `x,y` in pixels
        #[arg(long, value_parser = parse_point)]
        mouse: Option<Vec2>,
        /// Animation time in seconds
        #[arg(long, default_value_t = 0.0)]
        time: f32,
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
    },
    /// Load the document and report references that did not resolve
    Check,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("no layout named '{0}'")]
    UnknownLayout(String),
}

/// Initialize logging, writing to CLARITY_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("CLARITY_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check => check(cli.options.as_deref(), cli.document),
        Commands::Render {
            stacks,
            width,
            height,
            icons,
            numbers,
            layout,
            ignore_layout,
            in_combat,
            competitive,
            filter,
            mouse,
            time,
            out,
        } => {
            let frame = FrameArgs {
                stacks,
                screen: (width, height),
                layout,
                ignore_layout,
                game: GameState {
                    in_combat,
                    competitive,
                },
                filter,
                mouse,
                time,
            };
            render(
                cli.options.as_deref(),
                cli.document,
                &frame,
                icons.as_deref(),
                numbers.as_deref(),
                &out,
            )
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

struct FrameArgs {
    stacks: Vec<StackedBuff>,
    screen: (u32, u32),
    layout: Option<String>,
    ignore_layout: bool,
    game: GameState,
    filter: Option<String>,
    mouse: Option<Vec2>,
    time: f32,
}

/// Options from the given file or the confy location; defaults when unreadable
fn load_options(path: Option<&Path>) -> GeneralOptions {
    let loaded = match path {
        Some(path) => persistence::load_options_from(path),
        None => persistence::load_options(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load options, using defaults");
        GeneralOptions::default()
    })
}

fn open_state(
    options_path: Option<&Path>,
    document: Option<PathBuf>,
) -> Result<(OverlayState<DocumentStore>, LoadReport), AppError> {
    let options = load_options(options_path);
    let store = match document {
        Some(path) => DocumentStore::new(path),
        None => DocumentStore::from_options(&options)?,
    };
    tracing::info!(path = ?store.path(), "Opening overlay document");
    Ok(OverlayState::load(Arc::new(builtin_catalog()), store, options)?)
}

fn log_report(report: &LoadReport) {
    for id in &report.unknown_buffs {
        tracing::warn!(buff_id = id, "Unknown buff, shown as the Unknown icon");
    }
    for name in &report.missing_styles {
        tracing::warn!(style = %name, "Missing style, items use Default");
    }
    for name in &report.missing_grids {
        tracing::warn!(grid = %name, "Layout references a missing grid");
    }
    for name in &report.duplicate_names {
        tracing::warn!(%name, "Repeated name renamed, references use the first");
    }
}

fn check(options_path: Option<&Path>, document: Option<PathBuf>) -> Result<(), AppError> {
    let (state, report) = open_state(options_path, document)?;
    log_report(&report);

    let items: usize = state.grids().grids().iter().map(|g| g.items.len()).sum();
    tracing::info!(
        grids = state.grids().len(),
        items,
        styles = state.styles().len(),
        layouts = state.layouts().len(),
        clean = report.is_clean(),
        "Document checked"
    );
    Ok(())
}

fn render(
    options_path: Option<&Path>,
    document: Option<PathBuf>,
    frame: &FrameArgs,
    icons: Option<&Path>,
    numbers: Option<&Path>,
    out: &Path,
) -> Result<(), AppError> {
    let (mut state, report) = open_state(options_path, document)?;
    log_report(&report);

    let (width, height) = frame.screen;
    state.set_screen_size(Vec2::new(width as f32, height as f32));
    state.update_stacks(&frame.stacks);
    state.set_game_state(frame.game);
    state.set_ignore_layout(frame.ignore_layout);
    if let Some(filter) = &frame.filter {
        state.set_analyzer_filter(filter.as_str());
    }
    if let Some(name) = &frame.layout {
        let index = state
            .layouts()
            .find(name)
            .ok_or_else(|| AppError::UnknownLayout(name.clone()))?;
        state.select_layout(Some(index))?;
    }
    if let Some(mouse) = frame.mouse {
        state.mouse_moved(mouse);
    }

    let icons = match icons {
        Some(path) => Atlas::open(path)?,
        None => Atlas::blank(BLANK_ATLAS_SIZE, BLANK_ATLAS_SIZE)?,
    };
    let numbers = numbers.map(Atlas::open).transpose()?;
    let mut sink =
        SoftwareSink::new(width, height, icons, numbers)?.with_filtering(state.options().better_filtering);

    state.render(&mut sink, frame.time)?;
    sink.save_png(out)?;

    tracing::info!(instances = sink.drawn(), path = ?out, "Rendered frame");
    Ok(())
}

/// `id=count`
fn parse_stack(s: &str) -> Result<StackedBuff, String> {
    let (id, count) = s.split_once('=').ok_or_else(|| format!("expected id=count, got '{s}'"))?;
    let id: u32 = id.trim().parse().map_err(|e| format!("bad buff id '{id}': {e}"))?;
    let count: i32 = count.trim().parse().map_err(|e| format!("bad count '{count}': {e}"))?;
    if id == 0 {
        return Err("buff id 0 terminates the stack table".to_string());
    }
    Ok(StackedBuff::new(id, count))
}

/// `x,y`
fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Vec2::new(x, y))
}
