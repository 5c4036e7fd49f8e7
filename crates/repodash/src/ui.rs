use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use repodash_core::display::{row_cells, COLUMN_HEADERS};
use repodash_core::RepoRecord;

use crate::app::{App, SessionState};

#[derive(Clone, Copy)]
struct Theme {
    text: Color,
    muted: Color,
    title: Color,
    alert: Color,
    selection_bg: Color,
    selection_fg: Color,
}

fn theme() -> Theme {
    Theme {
        text: Color::Gray,
        muted: Color::DarkGray,
        title: Color::Cyan,
        alert: Color::Red,
        selection_bg: Color::Green,
        selection_fg: Color::Black,
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let records = app.snapshot();
    let now = Utc::now();
    let theme = theme();
    let area = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, &records, theme, layout[0]);
    render_records(frame, app, &records, now, theme, layout[1]);
    render_footer(frame, theme, layout[2]);

    if app.state == SessionState::DetailShown {
        render_detail_modal(frame, app, &records, now, theme, area);
    }
}

fn render_header(
    frame: &mut Frame,
    app: &App,
    records: &[RepoRecord],
    theme: Theme,
    area: Rect,
) {
    let out_of_sync = records.iter().filter(|r| r.is_out_of_sync()).count();
    let mut fields = vec![
        format!("repos: {}", records.len()),
        format!("out of sync: {out_of_sync}"),
    ];
    if app.state == SessionState::Scanning {
        fields.push("scanning...".to_string());
    }
    if let Some(note) = app.status_note.as_deref() {
        fields.push(note.to_string());
    }
    let line = Line::from(Span::styled(
        fields.join(" | "),
        Style::default().fg(theme.text),
    ));
    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.muted))
                .title(Span::styled(
                    "repodash",
                    Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
                )),
        ),
        area,
    );
}

fn render_records(
    frame: &mut Frame,
    app: &App,
    records: &[RepoRecord],
    now: DateTime<Utc>,
    theme: Theme,
    area: Rect,
) {
    if records.is_empty() {
        frame.render_widget(
            Paragraph::new("no repos found").style(Style::default().fg(theme.muted)),
            area,
        );
        return;
    }

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if record.is_out_of_sync() {
                Style::default().fg(theme.alert)
            } else {
                Style::default().fg(theme.text)
            };
            let mut cells = vec![Cell::from((i + 1).to_string())];
            cells.extend(row_cells(record, now).into_iter().map(Cell::from));
            Row::new(cells).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(40),
        Constraint::Min(12),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(COLUMN_HEADERS.iter().copied())
                .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .fg(theme.selection_fg),
        );

    let mut state = TableState::default();
    state.select(Some(app.cursor.min(records.len().saturating_sub(1))));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, theme: Theme, area: Rect) {
    frame.render_widget(
        Paragraph::new("up/down move | space detail | enter sync | q quit")
            .style(Style::default().fg(theme.muted)),
        area,
    );
}

fn render_detail_modal(
    frame: &mut Frame,
    app: &App,
    records: &[RepoRecord],
    now: DateTime<Utc>,
    theme: Theme,
    area: Rect,
) {
    let modal = centered_rect(area, 76, 6);
    let selected = app.cursor.min(records.len().saturating_sub(1));
    let mut lines = Vec::new();
    if let Some(record) = records.get(selected) {
        let mut cells = vec![(selected + 1).to_string()];
        cells.extend(row_cells(record, now));
        lines.push(Line::from(cells.join("  ")));
        lines.push(Line::from(Span::styled(
            format!("state: {}", record.sync_state()),
            Style::default().fg(theme.muted),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("cursor {}/{}", selected + 1, records.len()),
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title))
                .title("detail"),
        ),
        modal,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 30);
        let modal = centered_rect(area, 76, 6);
        assert_eq!(modal.x, 12);
        assert_eq!(modal.y, 12);
        assert_eq!(modal.width, 76);
        assert_eq!(modal.height, 6);
    }

    #[test]
    fn centered_rect_shrinks_to_small_terminals() {
        let area = Rect::new(0, 0, 40, 4);
        let modal = centered_rect(area, 76, 6);
        assert!(modal.width <= area.width);
        assert!(modal.height <= area.height);
    }
}
