use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::Result;
use mirror_core::{load_display_config, ViewMode, ViewState};
use segment_runtime::{parse_wire_date, ExportScope};
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod batch;
mod config_watch;
mod log_capture;
mod snapshot;
mod source;
mod sse;
mod ui;

use app::InspectorApp;
use backend::{BackendClient, DEFAULT_BACKEND_URL};
use log_capture::LogCaptureLayer;
use snapshot::SnapshotSource;
use source::DataSource;
use ui::UiState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Segment mirror map inspector", long_about = None)]
struct Cli {
    /// Base URL of the segment database service.
    #[arg(long, global = true, default_value = DEFAULT_BACKEND_URL)]
    backend: String,
    /// Read occupancy from a snapshot file instead of the service. Edits are refused.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Display configuration file. The terminal UI reloads it when it changes.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive terminal inspector (default).
    Tui,
    /// Write the mirror map as SVG.
    Render {
        #[arg(long, short)]
        out: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "installed", value_parser = parse_view_arg)]
        view: ViewMode,
        /// Label segments with their ids instead of positions.
        #[arg(long)]
        ids: bool,
        /// Include the spare sector.
        #[arg(long)]
        spares: bool,
    },
    /// Print the legend table for a categorical view.
    Legend {
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_view_arg)]
        view: ViewMode,
    },
    /// Export prime positions as JSON.
    Export {
        #[arg(long, short)]
        out: PathBuf,
        /// Only positions changed at the most recent change.
        #[arg(long)]
        recent: bool,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Apply an exported JSON file to the database.
    Import { file: PathBuf },
}

fn parse_date_arg(text: &str) -> Result<NaiveDate, String> {
    parse_wire_date(text).map_err(|err| format!("expected yyyy-MM-dd: {err}"))
}

fn parse_view_arg(text: &str) -> Result<ViewMode, String> {
    ViewMode::from_key(text).ok_or_else(|| {
        let keys: Vec<&str> = ViewMode::ALL.iter().map(|mode| mode.key()).collect();
        format!("unknown view '{text}', expected one of {}", keys.join(", "))
    })
}

fn open_source(cli: &Cli) -> Result<DataSource> {
    match &cli.snapshot {
        Some(path) => Ok(DataSource::Snapshot(SnapshotSource::from_file(path)?)),
        None => Ok(DataSource::Backend(BackendClient::new(&cli.backend))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Tui);
    match command {
        Command::Tui => run_tui(cli).await,
        command => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .compact()
                .with_writer(std::io::stderr)
                .init();
            run_batch(&cli, command).await
        }
    }
}

async fn run_tui(cli: Cli) -> Result<()> {
    let (log_tx, log_rx) = crossbeam_channel::unbounded();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(LogCaptureLayer::new(log_tx))
        .init();

    let (config, metadata) = load_display_config(cli.config.as_deref());
    let source = Arc::new(open_source(&cli)?);
    info!(target: "segment_map::inspector", source = %source.describe(), "inspector.starting");

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let _watch = match metadata.path() {
        Some(path) => match config_watch::watch_display_config(path, event_tx.clone()) {
            Ok(watch) => Some(watch),
            Err(err) => {
                warn!(
                    target: "segment_map::config",
                    error = %err,
                    "display_config.watch_unavailable"
                );
                None
            }
        },
        None => None,
    };

    let ui_state = UiState::new(
        ViewState::default(),
        config,
        source.describe(),
        source.is_read_only(),
    );
    let runtime = Handle::current();
    let ui = tokio::task::spawn_blocking(move || -> Result<()> {
        let app = InspectorApp::new(ui_state, source, runtime, (event_tx, event_rx), log_rx)?;
        app.run()
    });
    ui.await??;
    info!(target: "segment_map::inspector", "inspector.stopped");
    Ok(())
}

async fn run_batch(cli: &Cli, command: Command) -> Result<()> {
    let (config, _) = load_display_config(cli.config.as_deref());
    let source = open_source(cli)?;

    match command {
        Command::Tui => Ok(()),
        Command::Render { out, date, view, ids, spares } => {
            batch::render(&source, &config, &out, date, view, ids, spares).await
        }
        Command::Legend { date, view } => {
            let text = batch::legend(&source, &config, date, view).await?;
            println!("{text}");
            Ok(())
        }
        Command::Export { out, recent, date } => {
            let scope = if recent { ExportScope::Recent } else { ExportScope::All };
            let count = batch::export(&source, &out, date, scope).await?;
            println!("exported {count} positions to {}", out.display());
            Ok(())
        }
        Command::Import { file } => {
            let count = batch::import(&source, &file).await?;
            println!("imported {count} positions from {}", file.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommand_defaults_to_tui() {
        let cli = Cli::try_parse_from(["segment-inspector"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.backend, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn render_arguments_parse() {
        let cli = Cli::try_parse_from([
            "segment-inspector",
            "render",
            "--out",
            "mirror.svg",
            "--date",
            "2023-06-01",
            "--view",
            "riskofloss",
            "--ids",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Render { date, view, ids, spares, .. }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2023, 6, 1));
                assert_eq!(view, ViewMode::RiskOfLoss);
                assert!(ids);
                assert!(!spares);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_view_is_rejected() {
        let result = Cli::try_parse_from(["segment-inspector", "legend", "--view", "heatmap"]);
        assert!(result.is_err());
    }
}
