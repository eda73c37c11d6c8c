use ratatui::prelude::*;
use ratatui::widgets::{Clear, List, ListItem, Paragraph};

use crate::model::ExitChoice;
use crate::ui::AppState;
use crate::widgets::chrome::panel_block;

/// Rect of `pct_x`% by `pct_y`% centred in `r`.
pub(crate) fn centered_rect(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(rows[1])[1]
}

pub fn draw_exit_picker(f: &mut Frame, screen: Rect, state: &AppState) {
    let Some(picker) = &state.picker else {
        return;
    };
    let theme = &state.theme;
    let area = centered_rect(80, 50, screen);
    f.render_widget(Clear, area);
    let block = panel_block("Select Exit Node", true, theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let active = state.active_exit_node();
    let items: Vec<ListItem> = picker
        .choices
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut text = format!("  {}", c.label());
            if matches!(c, ExitChoice::Node(ip) if Some(ip.as_str()) == active) {
                text.push_str("  (active)");
            }
            let style = if i == picker.selected {
                theme.list_cursor_style()
            } else {
                Style::default()
            };
            ListItem::new(text).style(style)
        })
        .collect();
    f.render_widget(List::new(items), chunks[0]);
    f.render_widget(
        Paragraph::new("Enter apply  Esc cancel").style(theme.text_muted()),
        chunks[1],
    );
}
