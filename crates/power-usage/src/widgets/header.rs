use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
    Frame,
};

use crate::{AppState, Tab};

pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(24)])
            .split(area);

        let selected = Tab::ALL
            .iter()
            .position(|tab| *tab == state.tab)
            .unwrap_or(0);

        let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
            .block(Block::bordered().title("Power Usage Calendar"))
            .select(selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_widget(tabs, chunks[0]);

        let spinner = if state.is_loading {
            state.get_spinner_char().to_string()
        } else {
            " ".to_string()
        };

        let period = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}-{:02}", state.year, state.month),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(spinner, Style::default().fg(Color::Yellow)),
        ]))
        .block(Block::bordered().title("Period"));

        frame.render_widget(period, chunks[1]);
    }
}
