use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::AppState;

pub struct StatisticsWidget;

impl StatisticsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let stats = state.get_month_stats();

        let mut stats_text = vec![
            Line::from(vec![
                Span::styled("Data Status: ", Style::default().fg(Color::White)),
                Span::styled(
                    if state.data_loaded {
                        format!("Loaded ({} records)", state.dashboard.record_count())
                    } else if state.is_loading {
                        "Loading...".to_string()
                    } else {
                        "No data".to_string()
                    },
                    Style::default()
                        .fg(if state.data_loaded {
                            Color::Green
                        } else {
                            Color::Red
                        })
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("This Month: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:.1} kWh", stats.month.usage()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {:.2}", stats.month.cost()),
                    Style::default().fg(Color::Green),
                ),
            ]),
            Line::from(vec![
                Span::styled("This Year: ", Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:.1} kWh", stats.year.usage()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {:.2}", stats.year.cost()),
                    Style::default().fg(Color::Green),
                ),
            ]),
        ];

        if let Some(error) = &state.error_message {
            stats_text.push(Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::styled(
                    error.chars().take(60).collect::<String>()
                        + if error.chars().count() > 60 { "..." } else { "" },
                    Style::default().fg(Color::Red),
                ),
            ]));
        } else {
            let updated = state
                .dashboard
                .last_update()
                .map(|t| t.format("%H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());

            stats_text.push(Line::from(vec![
                Span::styled("Last Update: ", Style::default().fg(Color::White)),
                Span::styled(updated, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("  (checked {})", state.last_check.format("%H:%M:%S")),
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }

        let stats = Paragraph::new(stats_text)
            .block(Block::bordered().title("Statistics"))
            .alignment(Alignment::Left);

        frame.render_widget(stats, area);
    }
}
