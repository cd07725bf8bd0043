use power_usage_calendar::{ChartSeries, TouComponent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{AppState, Tab};

pub struct SeriesWidget;

impl SeriesWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let series = state.get_series();
        let title = match state.tab {
            Tab::Year => "Usage by Year".to_string(),
            Tab::Month => format!("Usage by Month ({})", state.year),
            Tab::Calendar | Tab::Day => {
                format!("Usage by Day ({}-{:02})", state.year, state.month)
            }
        };

        if series.is_empty() {
            let empty = Paragraph::new("No usage data for this period")
                .style(Style::default().fg(Color::Gray))
                .block(Block::bordered().title(title));
            frame.render_widget(empty, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        Self::render_chart(frame, chunks[0], &series, &title);
        Self::render_table(frame, chunks[1], &series);
    }

    fn component_color(component: TouComponent) -> Color {
        match component {
            TouComponent::Valley => Color::Blue,
            TouComponent::Peak => Color::Red,
            TouComponent::Normal => Color::Green,
            TouComponent::Sharp => Color::Magenta,
        }
    }

    /// Bar per category scaled to its total; unbalanced periods are drawn hollow.
    fn render_chart(frame: &mut Frame, area: Rect, series: &ChartSeries, title: &str) {
        let bars: Vec<Bar> = series
            .categories()
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let style = if series.balanced()[i] {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Bar::default()
                    .label(Line::from(category.clone()))
                    .value(series.total()[i].round().max(0.0) as u64)
                    .text_value(format!("{:.0}", series.total()[i]))
                    .style(style)
            })
            .collect();

        let chart = BarChart::default()
            .block(Block::bordered().title(title.to_string()))
            .data(BarGroup::default().bars(&bars))
            .bar_width(Self::bar_width(area, series.len()))
            .bar_gap(1)
            .max(series.max_total().ceil().max(1.0) as u64);

        frame.render_widget(chart, area);
    }

    fn bar_width(area: Rect, count: usize) -> u16 {
        if count == 0 {
            return 1;
        }
        let inner = area.width.saturating_sub(2) as usize;
        ((inner / count).saturating_sub(1)).clamp(1, 9) as u16
    }

    fn render_table(frame: &mut Frame, area: Rect, series: &ChartSeries) {
        let components = series.active_components();

        let mut header_cells = vec![Cell::from("Period")];
        header_cells.extend(components.iter().map(|c| {
            Cell::from(c.name()).style(Style::default().fg(Self::component_color(*c)))
        }));
        header_cells.push(Cell::from("Total"));
        header_cells.push(Cell::from("Unattributed"));
        header_cells.push(Cell::from("Cost"));

        let header = Row::new(header_cells).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = (0..series.len())
            .map(|i| {
                let mut cells = vec![Cell::from(series.categories()[i].clone())];
                cells.extend(
                    components
                        .iter()
                        .map(|c| Cell::from(format!("{:.2}", series.component(*c)[i]))),
                );
                cells.push(Cell::from(format!("{:.2}", series.total()[i])));

                let unattributed = series.unattributed()[i];
                cells.push(if unattributed > 0.0 {
                    Cell::from(format!("{:.2}", unattributed))
                        .style(Style::default().fg(Color::Red))
                } else {
                    Cell::from("-")
                });
                cells.push(Cell::from(format!("{:.2}", series.cost()[i])));

                let row = Row::new(cells);
                if series.balanced()[i] {
                    row
                } else {
                    row.style(Style::default().add_modifier(Modifier::ITALIC))
                }
            })
            .collect();

        let widths = std::iter::once(Constraint::Length(8))
            .chain(components.iter().map(|_| Constraint::Length(10)))
            .chain([
                Constraint::Length(10),
                Constraint::Length(13),
                Constraint::Length(10),
            ])
            .collect::<Vec<_>>();

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title("Time-of-Use"));

        frame.render_widget(table, area);
    }
}
