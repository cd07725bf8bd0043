use power_usage_calendar::{Breakdown, Reconciliation, SliceKind, TouComponent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, Paragraph},
    Frame,
};

use crate::{AppState, YearView};

pub struct BreakdownWidget;

impl BreakdownWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = match state.year_view {
            YearView::Total => "All Years".to_string(),
            _ => format!("Year {}", state.year),
        };

        let breakdown = match state.get_breakdown() {
            Some(breakdown) if !breakdown.slices().is_empty() => breakdown,
            _ => {
                let empty = Paragraph::new("No usage data for this period")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::bordered().title(title));
                frame.render_widget(empty, area);
                return;
            }
        };

        let block = Block::bordered().title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(3)];
        constraints.extend(breakdown.slices().iter().map(|_| Constraint::Length(2)));
        constraints.push(Constraint::Min(0));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        frame.render_widget(Paragraph::new(Self::summary_lines(&breakdown)), chunks[0]);

        for (i, slice) in breakdown.slices().iter().enumerate() {
            let share = breakdown.share(slice);
            let color = Self::slice_color(slice.kind);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color).bg(Color::Black))
                .ratio(share.clamp(0.0, 1.0))
                .label(format!(
                    "{}: {:.2} kWh ({:.1}%)",
                    slice.kind.name(),
                    slice.value,
                    share * 100.0
                ));
            let row = if slice.kind == SliceKind::Unattributed {
                gauge.style(Style::default().add_modifier(Modifier::ITALIC))
            } else {
                gauge
            };
            frame.render_widget(row, chunks[i + 1]);
        }
    }

    fn slice_color(kind: SliceKind) -> Color {
        match kind {
            SliceKind::Component(TouComponent::Valley) => Color::Blue,
            SliceKind::Component(TouComponent::Peak) => Color::Red,
            SliceKind::Component(TouComponent::Normal) => Color::Green,
            SliceKind::Component(TouComponent::Sharp) => Color::Magenta,
            SliceKind::Unattributed => Color::DarkGray,
        }
    }

    /// Signed, so components exceeding the total read as a negative remainder.
    fn status_text(reconciliation: &Reconciliation) -> String {
        match reconciliation.remainder() {
            Some(remainder) if !reconciliation.is_balanced() => {
                format!("unbalanced by {:+.2}", remainder)
            }
            _ => "balanced".to_string(),
        }
    }

    fn summary_lines(breakdown: &Breakdown) -> Vec<Line<'static>> {
        let reconciliation = breakdown.reconciliation();
        let total = reconciliation
            .total()
            .map(|t| format!("{:.2} kWh", t))
            .unwrap_or_else(|| "n/a".to_string());

        let status_style = if reconciliation.is_balanced() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };
        let status = Span::styled(Self::status_text(reconciliation), status_style);

        vec![
            Line::from(vec![
                Span::styled("Total: ", Style::default().fg(Color::White)),
                Span::styled(
                    total,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  Cost: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:.2}", breakdown.cost()),
                    Style::default().fg(Color::Green),
                ),
            ]),
            Line::from(vec![
                Span::styled("Components: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:.2} kWh ", reconciliation.component_sum()),
                    Style::default().fg(Color::Cyan),
                ),
                status,
            ]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_usage_calendar::{ReconciliationEngine, TouComponents};

    #[test]
    fn test_status_text_keeps_sign() {
        let engine = ReconciliationEngine::new();
        let valley = |kwh| TouComponents::new(kwh, 0.0, 0.0, 0.0);

        let over = engine.reconcile_parts(&valley(100.0), Some(500.0), 200.0);
        assert_eq!(BreakdownWidget::status_text(&over), "unbalanced by +400.00");

        let under = engine.reconcile_parts(&valley(600.0), Some(100.0), 200.0);
        assert_eq!(BreakdownWidget::status_text(&under), "unbalanced by -500.00");

        let even = engine.reconcile_parts(&valley(100.0), Some(150.0), 200.0);
        assert_eq!(BreakdownWidget::status_text(&even), "balanced");
    }
}
