use std::collections::VecDeque;
use std::sync::Arc;

use mirror_core::{
    fill_color, hexagon_vertices, is_recently_changed, legend_rows, mirror_layout, DisplayConfig,
    MirrorStore, PlacedSegment, RequestFence, ViewMode, ViewState,
};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use segment_runtime::{Position, DATE_FORMAT};

use crate::source::PositionDetails;

pub struct UiState {
    pub view: ViewState,
    pub store: MirrorStore,
    pub details_fence: RequestFence,
    pub date_fence: RequestFence,
    pub config: Arc<DisplayConfig>,
    pub selected: Option<Position>,
    pub details: Option<PositionDetails>,
    /// Percent complete while a JIRA sync is running.
    pub sync_progress: Option<u8>,
    /// Advisory text shown under the mirror, e.g. a failed update.
    pub status: Option<String>,
    /// Command line contents while `:` input is active.
    pub input: Option<String>,
    pub read_only: bool,
    pub source_label: String,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl UiState {
    pub fn new(
        view: ViewState,
        config: Arc<DisplayConfig>,
        source_label: String,
        read_only: bool,
    ) -> Self {
        Self {
            view,
            store: MirrorStore::new(),
            details_fence: RequestFence::new(),
            date_fence: RequestFence::new(),
            config,
            selected: None,
            details: None,
            sync_progress: None,
            status: None,
            input: None,
            read_only,
            source_label,
            logs: VecDeque::new(),
            max_logs: 8,
        }
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn set_status<S: Into<String>>(&mut self, text: S) {
        self.status = Some(text.into());
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Length(7),
        ])
        .split(frame.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(3),
        ])
        .split(body[1]);

    draw_header(frame, rows[0], state);
    draw_mirror(frame, body[0], state);
    draw_legend(frame, side[0], state);
    draw_details(frame, side[1], state);
    draw_sync(frame, side[2], state);
    draw_command_line(frame, rows[2], state);
    draw_logs(frame, rows[3], state);
}

fn bordered_paragraph(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn flag(label: &str, on: bool) -> Span<'static> {
    let style = if on {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("{label}:{}", if on { "on" } else { "off" }), style)
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let data = state.store.data();
    let mut spans = vec![
        Span::styled(
            state.view.reference_date.format(DATE_FORMAT).to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(state.view.view_mode.title(), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        flag("ids", state.view.show_segment_ids),
        Span::raw(" "),
        flag("spares", state.view.show_spares),
        Span::raw(" | "),
        Span::raw(format!("installed {}", data.installed_count())),
    ];
    if let Some(changed) = data.most_recent_change {
        spans.push(Span::raw(format!(" | last change {}", changed.format(DATE_FORMAT))));
    }
    if data.auth_enabled {
        spans.push(Span::styled(" | auth", Style::default().fg(Color::Magenta)));
    }
    if state.store.is_loading() {
        spans.push(Span::styled(" | loading…", Style::default().fg(Color::DarkGray)));
    }
    let title = format!("Segment Mirror Map ({})", state.source_label);
    bordered_paragraph(frame, area, &title, vec![Line::from(spans)]);
}

fn hexagon_edges(segment: &PlacedSegment, radius: f64, flip: f64, color: Color) -> [CanvasLine; 6] {
    let vertices = hexagon_vertices(radius);
    std::array::from_fn(|i| {
        let (x1, y1) = vertices[i];
        let (x2, y2) = vertices[(i + 1) % 6];
        CanvasLine {
            x1: segment.x + x1,
            y1: flip - (segment.y + y1),
            x2: segment.x + x2,
            y2: flip - (segment.y + y2),
            color,
        }
    })
}

fn draw_mirror(frame: &mut Frame, area: Rect, state: &UiState) {
    let config = &state.config;
    let data = state.store.data();
    let layout = mirror_layout(&config.geometry, state.view.show_spares);
    let size = config.geometry.diameter;
    let radius = config.geometry.segment_radius;
    let title = if state.view.show_spares { "Spares" } else { "Mirror" };

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds([0.0, size])
        .y_bounds([0.0, size])
        .paint(|ctx| {
            for segment in &layout {
                let fill = fill_color(
                    segment.position,
                    &data.positions,
                    &data.segments,
                    state.view.view_mode,
                    config,
                );
                let color = fill.parse::<Color>().unwrap_or(Color::Gray);
                for shrink in [0.85, 0.6, 0.35] {
                    for edge in hexagon_edges(segment, radius * shrink, size, color) {
                        ctx.draw(&edge);
                    }
                }
                let recent = data
                    .most_recent_change
                    .is_some_and(|since| {
                        is_recently_changed(segment.position, &data.positions, since)
                    });
                if recent {
                    for edge in hexagon_edges(segment, radius, size, Color::White) {
                        ctx.draw(&edge);
                    }
                }
                if state.selected == Some(segment.position) {
                    ctx.print(
                        segment.x - radius / 2.0,
                        size - segment.y,
                        Span::styled("◆", Style::default().fg(Color::White)),
                    );
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_legend(frame: &mut Frame, area: Rect, state: &UiState) {
    let title = format!("Legend: {}", state.view.view_mode.title());
    let Some(rows) = legend_rows(state.view.view_mode, &state.store.data().segments, &state.config)
    else {
        let lines = sector_legend_lines(&state.config, state.view.view_mode);
        bordered_paragraph(frame, area, &title, lines);
        return;
    };

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let swatch = match row.color.as_deref().and_then(|text| text.parse::<Color>().ok()) {
                Some(color) => Cell::from(Span::styled("■", Style::default().fg(color))),
                None => Cell::from(" "),
            };
            let style = if row.is_total() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let types = if row.is_total() {
                String::new()
            } else {
                row.stats.distinct_types.to_string()
            };
            Row::new(vec![
                swatch,
                Cell::from(row.label.clone()),
                Cell::from(types),
                Cell::from(row.stats.prime_count.to_string()),
                Cell::from(row.stats.spare_count.to_string()),
                Cell::from(row.stats.total_count.to_string()),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["", "Category", "Types", "Prime", "Spare", "Total"])
        .style(Style::default().fg(Color::Yellow));
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(2),
            Constraint::Min(12),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn sector_legend_lines(config: &DisplayConfig, mode: ViewMode) -> Vec<Line<'static>> {
    let occupied_label = match mode {
        ViewMode::Planned => "planned",
        _ => "installed",
    };
    segment_runtime::Sector::ALL
        .into_iter()
        .map(|sector| {
            let swatch = |occupied: bool| {
                let color = config
                    .sector_color(sector, occupied)
                    .and_then(|text| text.parse::<Color>().ok())
                    .unwrap_or(Color::Gray);
                Span::styled("■ ", Style::default().fg(color))
            };
            Line::from(vec![
                Span::raw(format!("{sector}  ")),
                swatch(true),
                Span::raw(format!("{occupied_label}  ")),
                swatch(false),
                Span::raw("empty"),
            ])
        })
        .collect()
}

fn draw_details(frame: &mut Frame, area: Rect, state: &UiState) {
    let Some(position) = state.selected else {
        bordered_paragraph(
            frame,
            area,
            "Details",
            vec![Line::from("select a position with :select POS")],
        );
        return;
    };

    let data = state.store.data();
    let mut lines = Vec::new();
    let occupant = data.occupant(position).unwrap_or("empty");
    lines.push(Line::from(vec![
        Span::styled(position.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw(format!("  {occupant}")),
    ]));
    if let Some(tracker) = data.segments.get(&position) {
        lines.push(Line::from(format!(
            "{} {} | {} | {}",
            tracker.jira_key, tracker.part_number, tracker.status, tracker.item_location
        )));
    }
    if let Some(details) = &state.details {
        if !details.available_ids.is_empty() {
            lines.push(Line::from(format!(
                "available: {}",
                details.available_ids.join(", ")
            )));
        }
        for record in &details.history {
            lines.push(Line::from(format!(
                "{}  {}",
                record.date.format(DATE_FORMAT),
                record.maybe_id.as_deref().unwrap_or("(removed)")
            )));
        }
    }
    bordered_paragraph(frame, area, "Details", lines);
}

fn draw_sync(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("JIRA Sync");
    match state.sync_progress {
        Some(percent) => {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(Color::Cyan))
                .percent(u16::from(percent));
            frame.render_widget(gauge, area);
        }
        None => {
            let hint = if state.read_only { "unavailable offline" } else { "j to sync" };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
        }
    }
}

fn draw_command_line(frame: &mut Frame, area: Rect, state: &UiState) {
    let line = match (&state.input, &state.status) {
        (Some(input), _) => Line::from(vec![
            Span::styled(":", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
        ]),
        (None, Some(status)) => {
            let color = if status.starts_with("Error") {
                Color::Red
            } else {
                Color::Green
            };
            Line::from(Span::styled(status.clone(), Style::default().fg(color)))
        }
        (None, None) => Line::from(vec![
            Span::styled("1-7", Style::default().fg(Color::Yellow)),
            Span::raw(" view  "),
            Span::styled("i/s", Style::default().fg(Color::Yellow)),
            Span::raw(" ids/spares  "),
            Span::styled("←/→", Style::default().fg(Color::Yellow)),
            Span::raw(" change  "),
            Span::styled("t", Style::default().fg(Color::Yellow)),
            Span::raw(" today  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" refresh  "),
            Span::styled(":", Style::default().fg(Color::Yellow)),
            Span::raw(" command  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" quit"),
        ]),
    };
    bordered_paragraph(frame, area, "Command", vec![line]);
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry.as_str())))
        .collect();
    bordered_paragraph(frame, area, "Logs", lines);
}
