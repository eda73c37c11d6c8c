use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::AppState;

pub const TITLE: &str = "Ghostscale VPN Wrapper Manager";

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(state.theme.text_muted());
    let p = Paragraph::new(Line::from(Span::styled(TITLE, state.theme.title_style())))
        .alignment(Alignment::Center)
        .block(border);
    f.render_widget(p, area);
}
