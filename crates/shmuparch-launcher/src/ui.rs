//! Screen drawing

use crate::app::{App, Picker, Row};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use shmuparch_catalog::LogicalEntry;

const TITLE_WIDTH: usize = 44;

/// Draw the UI
pub(crate) fn draw_ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Query
            Constraint::Min(0),    // Games
            Constraint::Length(6), // Details
            Constraint::Length(3), // Help and status
        ])
        .split(frame.size());

    // Borders take two rows
    app.page_size = usize::from(chunks[2].height.saturating_sub(2)).max(1);

    draw_header(frame, chunks[0], app);
    draw_query(frame, chunks[1], app);
    draw_games(frame, chunks[2], app);
    draw_details(frame, chunks[3], app);
    draw_footer(frame, chunks[4], app);

    if let Some(picker) = app.picker.as_mut() {
        draw_picker(frame, picker);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mode = if app.is_remote() {
        "MiSTer CRT"
    } else {
        "Desktop"
    };
    let title = format!(
        "ShmupArch [{}]  Sort: {}  {} of {} titles",
        mode,
        app.sort_key,
        app.shown_count(),
        app.catalog().len()
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_query(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled("Filter: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.query.as_str()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let query = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("q<> d<> r: dev:"),
    );
    frame.render_widget(query, area);
}

fn entry_line(entry: &LogicalEntry) -> Line<'static> {
    let mut text = format!("{:<width$}", entry.title(), width = TITLE_WIDTH);
    let badges = entry.badges();
    if !badges.is_empty() {
        text.push(' ');
        text.push_str(&badges);
    }
    if let Some(counter) = entry.variant_counter() {
        text.push(' ');
        text.push_str(&counter);
    }

    if entry.is_available() {
        Line::from(text)
    } else {
        Line::from(vec![
            Span::styled(text, Style::default().fg(Color::DarkGray)),
            Span::styled(" [MISSING]", Style::default().fg(Color::Red)),
        ])
    }
}

fn draw_games(frame: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| match row {
            Row::Header(title) => ListItem::new(Line::from(Span::styled(
                format!("-- {} --", title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))),
            Row::Entry(id) => match app.entry(id) {
                Some(entry) => ListItem::new(entry_line(entry)),
                None => ListItem::new(id.clone()),
            },
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Games"))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_details(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match app.selected_entry() {
        Some(entry) => {
            let versions = entry
                .variants()
                .iter()
                .map(|v| {
                    let mark = if v.available { "" } else { " missing" };
                    format!("{} ({}{})", v.display_label(), v.rom, mark)
                })
                .collect::<Vec<_>>()
                .join(", ");

            let rom = entry
                .implicit_pick()
                .unwrap_or_else(|| entry.default_variant())
                .rom
                .clone();
            let core = app.resolver().core_for(entry, &rom, app.options());

            let def = entry.definition();
            let mut about = def.developer.clone();
            if let Some(year) = def.year {
                about.push_str(&format!(" ({})", year));
            }
            about.push_str(&format!("  [{}]", core.tag()));

            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Versions: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(versions),
                ]),
                Line::from(about),
                Line::from(entry.rating_details()),
            ];
            if let Some(notes) = &def.notes {
                lines.insert(2, Line::from(Span::styled(
                    notes.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
        None => vec![Line::from("No games match")],
    };

    let details = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(details, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.picker.is_some() {
        "[↑↓] Choose  [Enter] Launch  [Esc] Cancel"
    } else {
        "[↑↓] Navigate  [Enter] Launch  [Tab] Sort  [^V] Missing  [^R] Rescan  [Esc] Clear/Quit"
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, chunks[0]);
    frame.render_widget(status, chunks[1]);
}

fn draw_picker(frame: &mut Frame, picker: &mut Picker) {
    let height = picker.candidates.len() as u16 + 2;
    let area = centered(frame.size(), 50, height);

    let items: Vec<ListItem> = picker
        .candidates
        .iter()
        .map(|v| ListItem::new(format!("{} ({})", v.display_label(), v.rom)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Select version: {}", picker.title)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut picker.state);
}

/// Rect of `percent_x` width and fixed height centered in `area`
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
