use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph, Wrap};

use crate::model::ManagedProgram;
use crate::ui::{AppState, ViewState};
use crate::widgets::chrome::panel_block;

/// Visible `[start, end)` window that keeps `selected` on screen.
pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let sel = selected.min(total.saturating_sub(1));
    let ih = inner_h as usize;
    let start = sel.saturating_sub(ih - 1);
    let end = (start + ih).min(total);
    (start, end)
}

/// Row text and button label, e.g. `("vpnApp (enabled)", "Disable")`.
pub(crate) fn row_parts(p: &ManagedProgram) -> (String, &'static str) {
    (format!("{} ({})", p.name, p.status), p.status.toggle_label())
}

pub fn draw_program_list(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let block = panel_block("Programs", state.picker.is_none(), theme);
    let progs = match &state.programs {
        ViewState::Loading => {
            let p = Paragraph::new("Loading programs...")
                .style(theme.text_muted())
                .block(block);
            f.render_widget(p, area);
            return;
        }
        ViewState::Error(e) => {
            let lines = vec![
                Line::from(format!("Could not load programs: {e}")).style(theme.text_error()),
                Line::from(""),
                Line::from("Press r to retry").style(theme.text_muted()),
            ];
            let p = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true });
            f.render_widget(p, area);
            return;
        }
        ViewState::Displayed(p) => p,
    };
    if progs.is_empty() {
        let p = Paragraph::new("No managed programs")
            .style(theme.text_muted())
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let inner = block.inner(area);
    let (start, end) = compute_scroll_window(progs.len(), state.selected, inner.height);
    let width = inner.width as usize;
    let items: Vec<ListItem> = progs
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, p)| {
            let is_sel = idx == state.selected;
            let (label, button) = row_parts(p);
            let button = format!("[ {button} ]");
            let cursor = if is_sel { "> " } else { "  " };
            let used = cursor.chars().count() + label.chars().count() + button.chars().count();
            let pad = " ".repeat(width.saturating_sub(used).max(1));
            let label_style = if is_sel {
                theme.list_cursor_style()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{cursor}{label}"), label_style),
                Span::raw(pad),
                Span::styled(button, theme.toggle_button(p.status)),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramStatus;

    #[test]
    fn window_keeps_selected_visible() {
        assert_eq!(compute_scroll_window(20, 0, 5), (0, 5));
        assert_eq!(compute_scroll_window(20, 4, 5), (0, 5));
        assert_eq!(compute_scroll_window(20, 5, 5), (1, 6));
        assert_eq!(compute_scroll_window(20, 19, 5), (15, 20));
        assert_eq!(compute_scroll_window(0, 0, 5), (0, 0));
    }

    #[test]
    fn button_offers_the_opposite_action() {
        let on = ManagedProgram {
            name: "vpnApp".into(),
            status: ProgramStatus::Enabled,
        };
        assert_eq!(row_parts(&on), ("vpnApp (enabled)".to_string(), "Disable"));
        let off = ManagedProgram {
            name: "vpnApp".into(),
            status: ProgramStatus::Disabled,
        };
        assert_eq!(row_parts(&off), ("vpnApp (disabled)".to_string(), "Enable"));
    }
}
