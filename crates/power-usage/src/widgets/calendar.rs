use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::AppState;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub struct CalendarWidget;

impl CalendarWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let title = format!("{}-{:02}", state.year, state.month);
        let calendar = match state
            .dashboard
            .calendar(state.year, state.month, state.today())
        {
            Some(calendar) => calendar,
            None => {
                let empty = Paragraph::new("Invalid month").block(Block::bordered().title(title));
                frame.render_widget(empty, area);
                return;
            }
        };

        let header = Row::new(WEEKDAYS.iter().map(|d| {
            Cell::from(*d).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        }));

        let rows: Vec<Row> = calendar
            .weeks()
            .into_iter()
            .map(|week| {
                let cells = week.into_iter().map(|cell| match cell {
                    None => Cell::from(""),
                    Some(day) => {
                        let mut day_style = Style::default().fg(Color::White);
                        if day.is_today {
                            day_style = day_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                        }
                        if day.day == state.selected_day {
                            day_style = day_style.add_modifier(Modifier::REVERSED);
                        }

                        let mut lines = vec![Line::from(Span::styled(
                            format!("{:>2}", day.day),
                            day_style,
                        ))];
                        if day.has_data {
                            lines.push(Line::from(Span::styled(
                                format!("{:.2}", day.usage),
                                Style::default().fg(Color::Green),
                            )));
                            lines.push(Line::from(Span::styled(
                                format!("{:.2}", day.cost),
                                Style::default().fg(Color::Gray),
                            )));
                        }
                        Cell::from(lines)
                    }
                });
                Row::new(cells).height(3)
            })
            .collect();

        let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
            .header(header)
            .block(Block::bordered().title(title));

        frame.render_widget(table, area);
    }
}
