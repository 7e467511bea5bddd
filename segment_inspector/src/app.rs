use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use crossbeam_channel::{Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use mirror_core::{
    export_document, DisplayConfig, Fenced, LoadOutcome, MirrorData, RequestId, ViewAction,
    ViewMode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use segment_runtime::{
    parse_command_line, ExportDocument, ExportScope, InspectorCommand, Position, SegmentToM1Pos,
};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::backend::BackendError;
use crate::log_capture::LogEnvelope;
use crate::source::{DataSource, PositionDetails};
use crate::ui::{draw_ui, UiState};

/// Shown when the database rejects an edit.
pub const UPDATE_FAILED: &str = "Error: Failed to update the database";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateQuery {
    Today,
    Next,
    Prev,
}

/// Work the UI thread hands to the I/O side.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Load(RequestId, NaiveDate),
    ResolveDate(RequestId, DateQuery, NaiveDate),
    Details(RequestId, Position, NaiveDate),
    SetPosition(SegmentToM1Pos),
    Import(String),
    Export { scope: ExportScope, path: String },
    Sync,
}

/// Results flowing back to the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    Loaded(Fenced<std::result::Result<MirrorData, String>>),
    DateResolved {
        query: DateQuery,
        result: Fenced<std::result::Result<Option<NaiveDate>, String>>,
    },
    Details(Fenced<std::result::Result<PositionDetails, String>>),
    Saved(std::result::Result<String, String>),
    SyncProgress(u8),
    SyncFinished(std::result::Result<(), String>),
    ConfigReloaded(Arc<DisplayConfig>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Applies a view change and requests whatever data it invalidates.
pub fn apply_view_action(state: &mut UiState, action: ViewAction) -> Vec<Request> {
    let reload = action.needs_reload(&state.view);
    state.view.apply(action);
    if !reload {
        return Vec::new();
    }
    let mut requests = vec![load_request(state)];
    requests.extend(details_request(state));
    requests
}

fn load_request(state: &mut UiState) -> Request {
    let id = state.store.begin_load();
    Request::Load(id, state.view.reference_date)
}

/// Date lookups are fenced like loads: a newer lookup or an explicit date
/// supersedes any lookup still in flight.
fn date_request(state: &mut UiState, query: DateQuery, from: NaiveDate) -> Request {
    let id = state.date_fence.issue();
    Request::ResolveDate(id, query, from)
}

fn details_request(state: &mut UiState) -> Option<Request> {
    let position = state.selected?;
    let id = state.details_fence.issue();
    Some(Request::Details(id, position, state.view.reference_date))
}

/// Requests issued when the inspector starts: today's data, then a jump to
/// the most recent change.
pub fn startup_requests(state: &mut UiState) -> Vec<Request> {
    let load = load_request(state);
    vec![load, date_request(state, DateQuery::Today, today())]
}

pub fn handle_command(state: &mut UiState, command: InspectorCommand) -> Vec<Request> {
    match command {
        InspectorCommand::SetDate(date) => {
            state.date_fence.issue();
            apply_view_action(state, ViewAction::SetReferenceDate(date))
        }
        InspectorCommand::Today => vec![date_request(state, DateQuery::Today, today())],
        InspectorCommand::NextChange => {
            let from = state.view.reference_date;
            vec![date_request(state, DateQuery::Next, from)]
        }
        InspectorCommand::PrevChange => {
            let from = state.view.reference_date;
            vec![date_request(state, DateQuery::Prev, from)]
        }
        InspectorCommand::View(key) => match ViewMode::from_key(&key) {
            Some(mode) => apply_view_action(state, ViewAction::SetViewMode(mode)),
            None => {
                state.set_status(format!("Error: unknown view mode '{key}'"));
                Vec::new()
            }
        },
        InspectorCommand::ShowSegmentIds(Some(show)) => {
            apply_view_action(state, ViewAction::SetShowSegmentIds(show))
        }
        InspectorCommand::ShowSegmentIds(None) => {
            apply_view_action(state, ViewAction::ToggleSegmentIds)
        }
        InspectorCommand::ShowSpares(Some(show)) => {
            apply_view_action(state, ViewAction::SetShowSpares(show))
        }
        InspectorCommand::ShowSpares(None) => apply_view_action(state, ViewAction::ToggleSpares),
        InspectorCommand::Select(position) => {
            state.selected = Some(position);
            state.details = None;
            details_request(state).into_iter().collect()
        }
        InspectorCommand::SetPosition {
            position,
            segment_id,
            date,
        } => {
            if state.read_only {
                state.set_status("Error: the offline snapshot cannot be edited");
                return Vec::new();
            }
            vec![Request::SetPosition(SegmentToM1Pos {
                date: date.unwrap_or(state.view.reference_date),
                maybe_id: segment_id,
                position,
            })]
        }
        InspectorCommand::Export { scope, path } => vec![Request::Export { scope, path }],
        InspectorCommand::Import { path } => {
            if state.read_only {
                state.set_status("Error: the offline snapshot cannot be edited");
                return Vec::new();
            }
            vec![Request::Import(path)]
        }
        InspectorCommand::Sync => {
            if state.read_only {
                state.set_status("Error: JIRA sync needs the segment database");
                return Vec::new();
            }
            if state.sync_progress.is_some() {
                return Vec::new();
            }
            state.sync_progress = Some(0);
            vec![Request::Sync]
        }
        InspectorCommand::Refresh => {
            let mut requests = vec![load_request(state)];
            requests.extend(details_request(state));
            requests
        }
    }
}

/// Maps a key press to state changes and requests.
pub fn handle_key(state: &mut UiState, key: KeyEvent) -> (KeyOutcome, Vec<Request>) {
    if state.input.is_some() {
        return (KeyOutcome::Continue, handle_input_key(state, key));
    }

    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return (KeyOutcome::Quit, Vec::new()),
        KeyCode::Char(':') => {
            state.input = Some(String::new());
            state.status = None;
            return (KeyOutcome::Continue, Vec::new());
        }
        KeyCode::Char(digit @ '1'..='7') => {
            let slot = digit as usize - '1' as usize;
            return (
                KeyOutcome::Continue,
                apply_view_action(state, ViewAction::SetViewMode(ViewMode::ALL[slot])),
            );
        }
        KeyCode::Char('i') => InspectorCommand::ShowSegmentIds(None),
        KeyCode::Char('s') => InspectorCommand::ShowSpares(None),
        KeyCode::Left => InspectorCommand::PrevChange,
        KeyCode::Right => InspectorCommand::NextChange,
        KeyCode::Char('t') => InspectorCommand::Today,
        KeyCode::Char('r') => InspectorCommand::Refresh,
        KeyCode::Char('j') => InspectorCommand::Sync,
        _ => return (KeyOutcome::Continue, Vec::new()),
    };
    (KeyOutcome::Continue, handle_command(state, command))
}

fn handle_input_key(state: &mut UiState, key: KeyEvent) -> Vec<Request> {
    match key.code {
        KeyCode::Esc => state.input = None,
        KeyCode::Backspace => {
            if let Some(input) = state.input.as_mut() {
                input.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(input) = state.input.as_mut() {
                input.push(ch);
            }
        }
        KeyCode::Enter => {
            let line = state.input.take().unwrap_or_default();
            return submit_command_line(state, &line);
        }
        _ => {}
    }
    Vec::new()
}

pub fn submit_command_line(state: &mut UiState, line: &str) -> Vec<Request> {
    match parse_command_line(line) {
        Ok(command) => {
            state.status = None;
            handle_command(state, command)
        }
        Err(err) => {
            state.set_status(format!("Error: {err}"));
            Vec::new()
        }
    }
}

pub fn handle_event(state: &mut UiState, event: AppEvent) -> Vec<Request> {
    match event {
        AppEvent::Loaded(Fenced { id, value }) => match value {
            Ok(data) => {
                if state.store.apply(Fenced::new(id, data)) == LoadOutcome::Applied {
                    info!(target: "segment_map::inspector", request = %id, "inspector.data_loaded");
                }
                Vec::new()
            }
            Err(err) => {
                if state.store.fail(id) {
                    state.set_status(format!("Error: failed to load data: {err}"));
                }
                Vec::new()
            }
        },
        AppEvent::DateResolved { query, result } => {
            if !state.date_fence.accept(result.id) {
                return Vec::new();
            }
            resolved_date(state, query, result.value)
        }
        AppEvent::Details(Fenced { id, value }) => {
            if !state.details_fence.accept(id) {
                return Vec::new();
            }
            match value {
                Ok(details) => state.details = Some(details),
                Err(err) => state.set_status(format!("Error: {err}")),
            }
            Vec::new()
        }
        AppEvent::Saved(Ok(message)) => {
            state.set_status(message);
            handle_command(state, InspectorCommand::Refresh)
        }
        AppEvent::Saved(Err(message)) => {
            state.set_status(message);
            Vec::new()
        }
        AppEvent::SyncProgress(percent) => {
            state.sync_progress = Some(percent);
            Vec::new()
        }
        AppEvent::SyncFinished(result) => {
            state.sync_progress = None;
            match result {
                Ok(()) => {
                    state.set_status("JIRA sync complete");
                    handle_command(state, InspectorCommand::Refresh)
                }
                Err(err) => {
                    state.set_status(format!("Error: JIRA sync failed: {err}"));
                    Vec::new()
                }
            }
        }
        AppEvent::ConfigReloaded(config) => {
            state.config = config;
            state.set_status("Display config reloaded");
            Vec::new()
        }
    }
}

fn resolved_date(
    state: &mut UiState,
    query: DateQuery,
    result: std::result::Result<Option<NaiveDate>, String>,
) -> Vec<Request> {
    match result {
        Ok(Some(date)) => apply_view_action(state, ViewAction::SetReferenceDate(date)),
        Ok(None) => {
            let message = match query {
                DateQuery::Today => "No changes recorded yet",
                DateQuery::Next => "No later change",
                DateQuery::Prev => "No earlier change",
            };
            state.set_status(message);
            Vec::new()
        }
        Err(err) => {
            state.set_status(format!("Error: {err}"));
            Vec::new()
        }
    }
}

/// Date a lookup moves the view to. "Today" lands on the latest change on or
/// before today, or on today itself when nothing has changed yet.
pub async fn resolve_date(
    source: &DataSource,
    query: DateQuery,
    from: NaiveDate,
) -> std::result::Result<Option<NaiveDate>, BackendError> {
    match query {
        DateQuery::Today => Ok(Some(source.most_recent_change(from).await?.unwrap_or(from))),
        DateQuery::Next => source.next_change(from).await,
        DateQuery::Prev => source.prev_change(from).await,
    }
}

/// Writes the current data as an export document.
pub fn write_export(state: &UiState, scope: ExportScope, path: &Path) -> Result<usize> {
    let data = state.store.data();
    let document = export_document(
        state.view.reference_date,
        &data.positions,
        scope,
        data.most_recent_change,
    );
    let json = document.to_json_pretty()?;
    fs::write(path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(document.segments.len())
}

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    source: Arc<DataSource>,
    runtime: Handle,
    events: Sender<AppEvent>,
    event_receiver: Receiver<AppEvent>,
    log_receiver: Receiver<LogEnvelope>,
}

impl InspectorApp {
    pub fn new(
        ui_state: UiState,
        source: Arc<DataSource>,
        runtime: Handle,
        events: (Sender<AppEvent>, Receiver<AppEvent>),
        log_receiver: Receiver<LogEnvelope>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state,
            source,
            runtime,
            events: events.0,
            event_receiver: events.1,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        for request in startup_requests(&mut self.ui_state) {
            self.execute(request);
        }
        let mut last_draw = Instant::now();

        loop {
            while let Ok(event) = self.event_receiver.try_recv() {
                for request in handle_event(&mut self.ui_state, event) {
                    self.execute(request);
                }
            }

            while let Ok(envelope) = self.log_receiver.try_recv() {
                self.ui_state.push_log(envelope.display_line());
            }

            if last_draw.elapsed() >= Duration::from_millis(100) {
                self.terminal.draw(|frame| draw_ui(frame, &self.ui_state))?;
                last_draw = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    let (outcome, requests) = handle_key(&mut self.ui_state, key);
                    for request in requests {
                        self.execute(request);
                    }
                    if outcome == KeyOutcome::Quit {
                        break;
                    }
                }
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    fn execute(&mut self, request: Request) {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        match request {
            Request::Load(id, date) => {
                self.runtime.spawn(async move {
                    let result = source.load(date).await.map_err(|err| err.to_string());
                    let _ = events.send(AppEvent::Loaded(Fenced::new(id, result)));
                });
            }
            Request::ResolveDate(id, query, from) => {
                self.runtime.spawn(async move {
                    let result = resolve_date(&source, query, from)
                        .await
                        .map_err(|err| err.to_string());
                    let _ = events.send(AppEvent::DateResolved {
                        query,
                        result: Fenced::new(id, result),
                    });
                });
            }
            Request::Details(id, position, date) => {
                self.runtime.spawn(async move {
                    let result = source
                        .position_details(position, date)
                        .await
                        .map_err(|err| err.to_string());
                    let _ = events.send(AppEvent::Details(Fenced::new(id, result)));
                });
            }
            Request::SetPosition(record) => {
                self.runtime.spawn(async move {
                    let result = match source.set_position(&record).await {
                        Ok(()) => Ok(format!("Updated {}", record.position)),
                        Err(err) => {
                            warn!(
                                target: "segment_map::inspector",
                                position = %record.position,
                                error = %err,
                                "inspector.set_position_failed"
                            );
                            Err(UPDATE_FAILED.to_string())
                        }
                    };
                    let _ = events.send(AppEvent::Saved(result));
                });
            }
            Request::Import(path) => {
                let document = fs::read_to_string(&path)
                    .map_err(|err| format!("Error: failed to read {path}: {err}"))
                    .and_then(|contents| {
                        ExportDocument::parse_str(&contents).map_err(|err| format!("Error: {err}"))
                    });
                let validated = match document {
                    Ok(validated) => validated,
                    Err(message) => {
                        self.ui_state.set_status(message);
                        return;
                    }
                };
                let count = validated.segments.len();
                let positions = validated.into_positions();
                self.runtime.spawn(async move {
                    let result = match source.set_positions(&positions).await {
                        Ok(()) => Ok(format!("Imported {count} positions from {path}")),
                        Err(err) => {
                            warn!(
                                target: "segment_map::inspector",
                                error = %err,
                                "inspector.import_failed"
                            );
                            Err(UPDATE_FAILED.to_string())
                        }
                    };
                    let _ = events.send(AppEvent::Saved(result));
                });
            }
            Request::Export { scope, path } => {
                match write_export(&self.ui_state, scope, Path::new(&path)) {
                    Ok(count) => self
                        .ui_state
                        .set_status(format!("Exported {count} positions to {path}")),
                    Err(err) => self.ui_state.set_status(format!("Error: {err:#}")),
                }
            }
            Request::Sync => {
                self.runtime.spawn(async move {
                    let progress_events = events.clone();
                    let result = source
                        .sync_with_jira(|percent| {
                            let _ = progress_events.send(AppEvent::SyncProgress(percent));
                        })
                        .await
                        .map_err(|err| err.to_string());
                    let _ = events.send(AppEvent::SyncFinished(result));
                });
            }
        }
    }
}
