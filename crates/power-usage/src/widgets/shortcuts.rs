use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{AppState, Tab};

pub struct ShortcutsWidget;

impl ShortcutsWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut keys = vec![
            ("q", "quit"),
            ("r", "reload"),
            ("tab", "view"),
            ("←/→", "month"),
            ("↑/↓", "year"),
            ("t", "today"),
        ];

        match state.tab {
            Tab::Calendar | Tab::Day => {
                keys.push(("h/l/j/k", "day"));
                keys.push(("d", "detail"));
            }
            Tab::Year => keys.push(("v", "year view")),
            Tab::Month => {}
        }

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (i, (key, action)) in keys.iter().enumerate() {
            spans.push(Span::styled(
                *key,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            let separator = if i + 1 < keys.len() { ", " } else { "" };
            spans.push(Span::styled(
                format!(" {}{}", action, separator),
                Style::default().fg(Color::Gray),
            ));
        }

        let shortcuts = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);

        frame.render_widget(shortcuts, area);
    }
}
