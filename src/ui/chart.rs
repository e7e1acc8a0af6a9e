// ============================================================================
// Chart - Graphique ligne du Close
// ============================================================================
// Trace le Close en fonction de la date, une observation par point.
// Les Close manquants sont sautés ; sans aucun Close numérique, un
// avertissement remplace le graphique.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de points (x, y)
// 3. Axis : bornes et labels des axes
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::Table;

/// Dessine le graphique du tableau courant
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let Some(table) = &app.table else {
        render_no_data(frame, area, "No data loaded");
        return;
    };

    if !table.has_numeric_close() {
        let msg = format!("Close has no numeric value for {}", table.symbol);
        render_no_data(frame, area, &msg);
        return;
    }

    render_close_line(frame, table, area);
}

/// Bornes de l'axe Y avec une marge de 5 %
///
/// Une série constante reçoit une marge de 1 pour rester visible. La borne
/// basse ne descend sous 0 que si la série a des valeurs négatives.
pub fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min, max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

    let margin = if max > min { (max - min) * 0.05 } else { 1.0 };
    let low = if min >= 0.0 { (min - margin).max(0.0) } else { min - margin };
    [low, max + margin]
}

/// Labels de l'axe X : première, milieu et dernière date
fn x_labels(series: &[(String, f64)]) -> Vec<Span<'static>> {
    let label = |i: usize| Span::raw(series.get(i).map(|(d, _)| d.clone()).unwrap_or_default());
    let last = series.len().saturating_sub(1);
    vec![label(0), label(last / 2), label(last)]
}

fn render_close_line(frame: &mut Frame, table: &Table, area: Rect) {
    let series = table.close_series();
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_date, close))| (i as f64, *close))
        .collect();

    let [y_min, y_max] = y_bounds(&points);

    let color = match (series.first(), series.last()) {
        (Some((_, first)), Some((_, last))) if last < first => Color::Red,
        _ => Color::Green,
    };

    let datasets = vec![Dataset::default()
        .name(table.symbol.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
        .labels(x_labels(&series));

    let y_axis = Axis::default()
        .title("Close")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.0}", y_min)),
            Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.0}", y_max)),
        ]);

    let title = match table.last_close() {
        Some(last) => format!(" {} Close ({}, {}) - last {:.2} ", table.symbol, table.period, table.interval, last),
        None => format!(" {} Close ", table.symbol),
    };

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Affiche un message quand il n'y a rien à tracer
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" ⚠ Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled("[F2] Back to table", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_bounds_with_margin() {
        let [lo, hi] = y_bounds(&[(0.0, 100.0), (1.0, 200.0)]);
        assert_eq!(lo, 95.0);
        assert_eq!(hi, 205.0);
    }

    #[test]
    fn test_y_bounds_keep_negative_values() {
        let [lo, hi] = y_bounds(&[(0.0, -10.0), (1.0, 10.0)]);
        assert_eq!(lo, -11.0);
        assert_eq!(hi, 11.0);
    }

    #[test]
    fn test_y_bounds_positive_series_stops_at_zero() {
        let [lo, _] = y_bounds(&[(0.0, 0.5), (1.0, 100.0)]);
        assert_eq!(lo, 0.0);
    }

    #[test]
    fn test_y_bounds_flat_series() {
        assert_eq!(y_bounds(&[(0.0, 50.0)]), [49.0, 51.0]);
    }

    #[test]
    fn test_x_labels() {
        let series = vec![
            ("2024-01-02".to_string(), 1.0),
            ("2024-01-03".to_string(), 2.0),
            ("2024-01-04".to_string(), 3.0),
        ];
        let labels: Vec<String> = x_labels(&series).iter().map(|s| s.content.to_string()).collect();
        assert_eq!(labels, vec!["2024-01-02", "2024-01-03", "2024-01-04"]);
    }
}
