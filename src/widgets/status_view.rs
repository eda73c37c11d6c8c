use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::model::VpnStatus;
use crate::ui::{AppState, ViewState};
use crate::widgets::chrome::panel_block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Active,
    Inactive,
    Pending,
}

/// Icon and text for the status row.
pub(crate) fn describe_status(view: &ViewState<VpnStatus>) -> (StatusIcon, String) {
    match view {
        ViewState::Loading => (StatusIcon::Pending, "Loading status...".to_string()),
        ViewState::Displayed(st) => match &st.active_exit_node {
            Some(ip) => (StatusIcon::Active, format!("Active Exit Node: {ip}")),
            None => (StatusIcon::Inactive, "No active Exit Node".to_string()),
        },
        ViewState::Error(e) => (StatusIcon::Inactive, format!("Status error: {e}")),
    }
}

pub fn draw_status_view(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let (icon, text) = describe_status(&state.status);
    let icon_span = match icon {
        StatusIcon::Active => Span::styled("●", theme.status_dot(true)),
        StatusIcon::Inactive => Span::styled("●", theme.status_dot(false)),
        StatusIcon::Pending => {
            let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][state.tick as usize % 6];
            Span::styled(spinner, theme.text_muted())
        }
    };
    let text_style = if matches!(state.status, ViewState::Error(_)) {
        theme.text_error()
    } else {
        Style::default()
    };
    let line = Line::from(vec![icon_span, Span::raw(" "), Span::styled(text, text_style)]);
    let p = Paragraph::new(line).block(panel_block("Status", false, theme));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_node_shows_address_with_active_icon() {
        let v = ViewState::Displayed(VpnStatus {
            active_exit_node: Some("1.2.3.4".into()),
        });
        assert_eq!(
            describe_status(&v),
            (StatusIcon::Active, "Active Exit Node: 1.2.3.4".to_string())
        );
    }

    #[test]
    fn no_node_shows_inactive_icon() {
        let v = ViewState::Displayed(VpnStatus::default());
        assert_eq!(
            describe_status(&v),
            (StatusIcon::Inactive, "No active Exit Node".to_string())
        );
    }

    #[test]
    fn error_is_reported_inline() {
        let v: ViewState<VpnStatus> = ViewState::Error("boom".into());
        let (icon, text) = describe_status(&v);
        assert_eq!(icon, StatusIcon::Inactive);
        assert_eq!(text, "Status error: boom");
    }
}
