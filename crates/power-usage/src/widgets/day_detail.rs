use power_usage_calendar::{DayDetail, SliceKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::AppState;

pub struct DayDetailPopup;

impl DayDetailPopup {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let popup_area = Self::centered_rect(50, 60, area);

        frame.render_widget(Clear, popup_area);

        let title = state
            .selected_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Day".to_string());

        let text = match state.get_day_detail() {
            Some(detail) => Self::detail_text(&detail),
            None => vec![
                Line::from(Span::styled(
                    "No usage recorded for this day",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(" "),
                Self::close_hint(),
            ],
        };

        let popup = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(title)
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(popup, popup_area);
    }

    fn detail_text(detail: &DayDetail) -> Vec<Line<'static>> {
        let record = detail.record();

        let mut lines = vec![
            Self::value_line("Usage: ", format!("{:.2} kWh", record.usage()), Color::Yellow),
            Self::value_line("Cost: ", format!("{:.2}", record.cost()), Color::Green),
            Self::value_line(
                "Average Price: ",
                format!("{:.4} /kWh", detail.average_price()),
                Color::Cyan,
            ),
            Line::from(" "),
            Line::from(Span::styled(
                "Time-of-Use:",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        let breakdown = detail.breakdown();
        for slice in breakdown.slices() {
            let style = match slice.kind {
                SliceKind::Unattributed => Style::default().fg(Color::Red),
                SliceKind::Component(_) => Style::default().fg(Color::White),
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "  {}: {:.2} kWh ({:.1}%)",
                    slice.kind.name(),
                    slice.value,
                    breakdown.share(slice) * 100.0
                ),
                style,
            )));
        }

        if let Some(remainder) = breakdown.reconciliation().remainder() {
            if remainder.abs() > f64::EPSILON {
                lines.push(Line::from(Span::styled(
                    format!("  Remainder: {:.2} kWh", remainder),
                    Style::default().fg(Color::Gray),
                )));
            }
        }

        lines.push(Line::from(" "));
        lines.push(Self::close_hint());
        lines
    }

    fn value_line(label: &'static str, value: String, color: Color) -> Line<'static> {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::White)),
            Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    }

    fn close_hint() -> Line<'static> {
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "d",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "esc",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to close", Style::default().fg(Color::Gray)),
        ])
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}
