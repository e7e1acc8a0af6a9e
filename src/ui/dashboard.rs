// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Layout vertical :
//   header  : titre
//   form    : symbole, intervalle, période
//   content : tableau normalisé ou graphique du Close
//   status  : message de statut, détails, raccourcis
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones
// 2. Table widget : lignes + largeurs de colonnes
// 3. Style : couleurs selon le champ actif ou la gravité du statut
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as TableRow, Table as TableWidget},
    Frame,
};

use crate::app::{App, FormField, Screen, StatusLevel};
use crate::export::CSV_HEADER;
use crate::models::Row;
use crate::ui::chart;

/// Nombre maximum de lignes de détails dans la barre d'état
const MAX_STATUS_DETAILS: usize = 6;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let detail_lines = app
        .status
        .as_ref()
        .map(|s| s.details.len().min(MAX_STATUS_DETAILS))
        .unwrap_or(0) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Header
            Constraint::Length(3),                // Formulaire
            Constraint::Min(0),                   // Tableau ou graphique
            Constraint::Length(4 + detail_lines), // Statut + raccourcis
        ])
        .split(frame.size());

    render_header(frame, chunks[0]);
    render_form(frame, app, chunks[1]);

    match app.screen {
        Screen::Table => render_table(frame, app, chunks[2]),
        Screen::Chart => chart::render_chart(frame, app, chunks[2]),
    }

    render_status(frame, app, chunks[3]);
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" SahamData ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Historical prices from Yahoo Finance",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Formulaire
// ============================================================================

/// Style d'un champ : surligné quand il a le focus
fn field_style(app: &App, field: FormField) -> Style {
    if app.focus == field {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Request ");

    let cursor = if app.focus == FormField::Symbol { "█" } else { "" };

    let line = Line::from(vec![
        Span::styled("Symbol: ", Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {}{} ", app.symbol_input, cursor), field_style(app, FormField::Symbol)),
        Span::raw("   "),
        Span::styled("Interval: ", Style::default().fg(Color::Cyan)),
        Span::styled(format!(" ◀ {} ▶ ", app.interval), field_style(app, FormField::Interval)),
        Span::raw("   "),
        Span::styled("Period: ", Style::default().fg(Color::Cyan)),
        Span::styled(format!(" ◀ {} ▶ ", app.period), field_style(app, FormField::Period)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

// ============================================================================
// Tableau
// ============================================================================

/// Formate un nombre pour l'affichage (manquant → vide)
///
/// Les prix IDX sont entiers : pas de décimales inutiles.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}

fn table_row(row: &Row) -> TableRow<'static> {
    TableRow::new(vec![
        Cell::from(row.date.clone().unwrap_or_default()),
        Cell::from(format_number(row.open)),
        Cell::from(format_number(row.high)),
        Cell::from(format_number(row.low)),
        Cell::from(format_number(row.close)),
        Cell::from(format_number(row.volume)),
        Cell::from(row.value),
        Cell::from(row.frequency),
        Cell::from(row.market_cap),
    ])
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let Some(table) = &app.table else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Data ");
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data loaded. Press [Enter] to fetch.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    // Bordures (2) + en-tête (1)
    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<TableRow> = table
        .rows
        .iter()
        .skip(app.scroll)
        .take(visible)
        .map(table_row)
        .collect();

    let header = TableRow::new(CSV_HEADER.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(16),
    ];

    let title = format!(
        " {} - {} rows ({}, {}) - row {} ",
        table.symbol,
        table.len(),
        table.period,
        table.interval,
        (app.scroll + 1).min(table.len())
    );

    let widget = TableWidget::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        );

    frame.render_widget(widget, area);
}

// ============================================================================
// Barre d'état
// ============================================================================

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (color, title) = match app.status.as_ref().map(|s| s.level) {
        Some(StatusLevel::Error) => (Color::Red, " ✗ Error "),
        Some(StatusLevel::Warning) => (Color::Yellow, " ⚠ Warning "),
        _ => (Color::Cyan, " Status "),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let mut lines = Vec::new();

    if app.is_awaiting_quit_confirmation() {
        lines.push(Line::from(vec![
            Span::styled("⚠  Press ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(
                "[Esc]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));
    } else if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for detail in status.details.iter().take(MAX_STATUS_DETAILS) {
            lines.push(Line::from(Span::styled(
                format!("  {}", detail),
                Style::default().fg(Color::Gray),
            )));
        }
    } else {
        lines.push(Line::from(""));
    }

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    lines.push(Line::from(vec![
        Span::styled("[Enter]", key),
        Span::raw(" Fetch  "),
        Span::styled("[Tab]", key),
        Span::raw(" Field  "),
        Span::styled("[←→]", key),
        Span::raw(" Change  "),
        Span::styled("[↑↓]", key),
        Span::raw(" Scroll  "),
        Span::styled("[F2]", key),
        Span::raw(" Chart  "),
        Span::styled("[F3]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Export CSV  "),
        Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Quit"),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
