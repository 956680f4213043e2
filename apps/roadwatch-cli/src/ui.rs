use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame, Terminal,
};
use roadwatch_dashboard::{AlertBanner, AlertKind, StatVariant};
use roadwatch_poller::FeedState;
use roadwatch_table::{DerivedRows, SortKey, TableViewModel};
use roadwatch_types::{camera::CameraStatus, incident::ConfidenceBand};

use crate::app::{App, Tab, TextField};

const TABLE_COLUMNS: [SortKey; 3] = [SortKey::Timestamp, SortKey::Kind, SortKey::Confidence];

const NO_INCIDENTS: &str = "No incidents recorded.";
const NO_CAMERAS: &str = "No cameras configured.";

pub async fn run(app: &mut App, tick: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, app, tick).await;

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    res
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while event::poll(Duration::ZERO)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !app.handle_key(key.code).await? {
                    return Ok(());
                }
            }
        }

        // Controllers publish from their own tasks; yield between frames.
        tokio::time::sleep(tick).await;
    }
}

fn draw(f: &mut Frame, app: &App) {
    let now = Instant::now();
    let banners = match app.tab {
        Tab::Dashboard => app.overview.banners(),
        Tab::LiveFeed => app.live.banners(),
        Tab::Incidents => app.incidents.banners(),
        Tab::Settings => app.settings.banners(now),
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(banners.len() as u16),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title("Roadwatch"))
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let banner_lines: Vec<Line> = banners.iter().map(banner_line).collect();
    f.render_widget(Paragraph::new(banner_lines), chunks[1]);

    match app.tab {
        Tab::Dashboard => draw_dashboard(f, app, chunks[2]),
        Tab::LiveFeed => draw_live_feed(f, app, chunks[2]),
        Tab::Incidents => draw_incidents(f, app, chunks[2]),
        Tab::Settings => draw_settings(f, app, chunks[2]),
    }

    f.render_widget(Paragraph::new(key_hints(app)), chunks[3]);
}

fn banner_line(banner: &AlertBanner) -> Line<'static> {
    let color = match banner.kind {
        AlertKind::Danger => Color::Red,
        AlertKind::Warning => Color::Yellow,
        AlertKind::Info => Color::Blue,
    };
    let mut spans = vec![Span::styled(
        format!("{} {}", banner.kind.icon(), banner.message),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(detail) = &banner.detail {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(detail.clone(), Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

fn key_hints(app: &App) -> Line<'static> {
    if let Some(edit) = &app.editing {
        return Line::from(vec![
            Span::styled(edit.field.label(), Style::default().fg(Color::Yellow)),
            Span::raw("  Enter commit  Tab next field  Esc cancel"),
        ]);
    }
    let hints = match app.tab {
        Tab::Dashboard => "r reload  t/y/c sort",
        Tab::LiveFeed => "i interval  r refresh",
        Tab::Incidents => "t/y/c sort  f filter  l limit  r reload",
        Tab::Settings => "Enter edit text  +/- interval  [/] threshold  a alerts  s save  x reset",
    };
    Line::from(vec![
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  "),
        Span::styled("1-4/Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" switch  "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" dismiss  "),
        Span::raw(hints),
    ])
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)].as_ref())
        .split(area);

    let cards = app.overview.stat_cards();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(chunks[0]);
    for (card, column) in cards.iter().zip(columns.iter()) {
        let color = match card.variant {
            StatVariant::Neutral => Color::White,
            StatVariant::Good => Color::Green,
            StatVariant::Warn => Color::Yellow,
            StatVariant::Danger => Color::Red,
        };
        let value = format!("{}{}", card.value, card.unit.unwrap_or_default());
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(card.description, Style::default().fg(Color::Gray))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} {}", card.icon, card.label)),
        );
        f.render_widget(body, *column);
    }

    render_incidents(
        f,
        chunks[1],
        app.overview.rows(),
        app.overview.table(),
        app.overview.is_loading(),
        "Recent Incidents".to_string(),
    );
}

fn draw_live_feed(f: &mut Frame, app: &App, area: Rect) {
    let summary = app.live.summary();
    let title = format!(
        "Live Feed  refresh {}  {} online · {} warning · {} offline",
        app.live.interval_label(),
        summary.online,
        summary.warning,
        summary.offline
    );

    let rows = app.live.tiles().iter().map(|tile| {
        let state = tile.state();
        let (feed_label, feed_color) = feed_cell(tile.camera.status, &state);
        let status_color = match tile.camera.status {
            CameraStatus::Online => Color::Green,
            CameraStatus::Warning => Color::Yellow,
            CameraStatus::Offline => Color::Red,
        };
        let fps = tile
            .camera
            .display_fps()
            .map(|fps| format!("{fps} fps"))
            .unwrap_or_default();
        let detail = match &state {
            FeedState::Ready(frame) => {
                format!("{} @ {}", frame.url, frame.fetched_at.format("%H:%M:%S"))
            }
            FeedState::Error(message) => message.clone(),
            _ => String::new(),
        };
        Row::new(vec![
            Cell::from(tile.camera.id.clone()),
            Cell::from(tile.camera.name.clone()),
            Cell::from(tile.camera.status.label()).style(Style::default().fg(status_color)),
            Cell::from(fps),
            Cell::from(feed_label).style(Style::default().fg(feed_color)),
            Cell::from(detail),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(22),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(17),
        Constraint::Min(10),
    ];
    let header = Row::new(vec!["ID", "Camera", "Status", "FPS", "Feed", "Frame"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let block = Block::default().borders(Borders::ALL).title(title);
    match placeholder(
        app.live.is_loading(),
        app.live.tiles().is_empty(),
        "Loading cameras…",
        NO_CAMERAS,
    ) {
        Some(text) => f.render_widget(placeholder_paragraph(text, block), area),
        None => f.render_widget(Table::new(rows, widths).header(header).block(block), area),
    }
}

fn draw_incidents(f: &mut Frame, app: &App, area: Rect) {
    let counts = app.incidents.counts();
    let title = format!(
        "Incidents [{}]  showing {} of {} · {} active  limit {}",
        app.incidents.table().filter().label(),
        counts.shown,
        counts.total,
        counts.active,
        app.incidents.limit(),
    );
    render_incidents(
        f,
        area,
        app.incidents.rows(),
        app.incidents.table(),
        app.incidents.is_loading(),
        title,
    );
}

/// Text shown instead of a list body: a loading note first, then the empty
/// state. `None` means the rows should be drawn.
fn placeholder(
    loading: bool,
    is_empty: bool,
    loading_text: &'static str,
    empty_text: &'static str,
) -> Option<&'static str> {
    if loading {
        Some(loading_text)
    } else if is_empty {
        Some(empty_text)
    } else {
        None
    }
}

fn placeholder_paragraph<'a>(text: &'static str, block: Block<'a>) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::Gray),
    )))
    .block(block)
}

/// Feed column for one tile. Offline cameras keep their last frame but are
/// labelled offline regardless of the fetch outcome.
fn feed_cell(status: CameraStatus, state: &FeedState) -> (&'static str, Color) {
    if status == CameraStatus::Offline {
        return ("Offline", Color::Red);
    }
    let color = match state {
        FeedState::Ready(_) => Color::Green,
        FeedState::Error(_) => Color::Red,
        _ => Color::Gray,
    };
    (state.label(), color)
}

fn render_incidents(
    f: &mut Frame,
    area: Rect,
    rows: DerivedRows<'_>,
    table: &TableViewModel,
    loading: bool,
    title: String,
) {
    let block = Block::default().borders(Borders::ALL).title(title);
    match placeholder(loading, rows.is_empty(), "Loading incidents…", NO_INCIDENTS) {
        Some(text) => f.render_widget(placeholder_paragraph(text, block), area),
        None => f.render_widget(incident_table(&rows, table).block(block), area),
    }
}

fn incident_table<'a>(rows: &DerivedRows<'a>, table: &TableViewModel) -> Table<'a> {
    let header = Row::new(
        ["ID", "Camera"]
            .into_iter()
            .map(String::from)
            .chain(
                TABLE_COLUMNS
                    .iter()
                    .map(|key| format!("{} {}", key.header(), table.indicator(*key).symbol())),
            )
            .chain(std::iter::once("Status".to_string()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows
        .iter()
        .map(|incident| {
            let confidence_color = match incident.confidence_band() {
                ConfidenceBand::High => Color::Red,
                ConfidenceBand::Medium => Color::Yellow,
                ConfidenceBand::Low => Color::Gray,
            };
            let status_color = if incident.resolved {
                Color::Green
            } else {
                Color::Red
            };
            Row::new(vec![
                Cell::from(incident.id.as_str()),
                Cell::from(format!("{} {}", incident.camera_id, incident.camera_name)),
                Cell::from(
                    incident
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%m-%d %H:%M")
                        .to_string(),
                ),
                Cell::from(incident.kind.as_str()),
                Cell::from(incident.confidence_percent())
                    .style(Style::default().fg(confidence_color)),
                Cell::from(incident.status_label()).style(Style::default().fg(status_color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(9),
    ];
    Table::new(body, widths).header(header)
}

/// The edit buffer with a cursor while `field` is being edited.
fn text_value(app: &App, field: TextField, committed: String) -> String {
    match &app.editing {
        Some(edit) if edit.field == field => format!("{}▏", edit.buffer),
        _ => committed,
    }
}

fn draw_settings(f: &mut Frame, app: &App, area: Rect) {
    let form = app.settings.form();
    let label = Style::default().fg(Color::Magenta);
    let lines = vec![
        Line::from(vec![
            Span::styled("API base URL      ", label),
            Span::raw(text_value(app, TextField::ApiBaseUrl, form.api_base_url.clone())),
        ]),
        Line::from(vec![
            Span::styled("Poll interval     ", label),
            Span::raw(format!("{} ms", form.poll_interval_ms)),
        ]),
        Line::from(vec![
            Span::styled("Camera IDs        ", label),
            Span::raw(text_value(app, TextField::CameraIds, form.camera_id_list().join(", "))),
        ]),
        Line::from(vec![
            Span::styled("Alert threshold   ", label),
            Span::raw(format!("{:.0}%", form.alert_threshold * 100.0)),
        ]),
        Line::from(vec![
            Span::styled("Alerts            ", label),
            Span::raw(if form.enable_alerts { "enabled" } else { "disabled" }),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Settings")),
        area,
    );
}
