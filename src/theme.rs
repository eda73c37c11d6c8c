use ratatui::style::{Color, Modifier, Style};

use crate::model::ProgramStatus;
use crate::ui::ToastLevel;

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub frame: Color,
    pub selected: Color,
    pub success: Color,
    pub error: Color,
    pub muted: Color,
}

impl Theme {
    pub fn synthwave_dark() -> Self {
        Self {
            bg: Color::Rgb(24, 24, 26),
            fg: Color::White,
            accent: Color::Rgb(64, 160, 255),
            frame: Color::Rgb(90, 90, 100),
            selected: Color::Rgb(255, 120, 0),
            success: Color::Green,
            error: Color::Red,
            muted: Color::DarkGray,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::synthwave_dark()
    }
}

impl Theme {
    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.selected)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn list_cursor_style(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    /// Green dot while traffic leaves through an exit node, red otherwise.
    pub fn status_dot(&self, active: bool) -> Style {
        let c = if active { self.success } else { self.error };
        Style::default().fg(c).add_modifier(Modifier::BOLD)
    }

    /// Enabled programs get a "pressed" button.
    pub fn toggle_button(&self, status: ProgramStatus) -> Style {
        match status {
            ProgramStatus::Enabled => Style::default()
                .fg(self.bg)
                .bg(self.success)
                .add_modifier(Modifier::BOLD),
            ProgramStatus::Disabled => Style::default().fg(self.fg).bg(self.frame),
        }
    }

    pub fn toast_color(&self, level: ToastLevel) -> Color {
        match level {
            ToastLevel::Success => self.success,
            ToastLevel::Error => self.error,
            ToastLevel::Info => self.accent,
        }
    }
}
