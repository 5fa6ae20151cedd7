//! Theme and styling configuration.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Dimmed text (hints, empty cells).
    pub muted: Color,
    /// Accent color for titles and the selected row.
    pub accent: Color,
    /// Border of unfocused panes.
    pub border: Color,
    /// Border of the focused pane.
    pub border_focused: Color,
    /// Text typed into inputs.
    pub input_fg: Color,
    /// Placeholder text in empty inputs.
    pub input_placeholder: Color,
    /// Background of the highlighted table row.
    pub selection_bg: Color,
    /// Destructive actions and error text.
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::DarkGray,
            border_focused: Color::Yellow,
            input_fg: Color::White,
            input_placeholder: Color::DarkGray,
            selection_bg: Color::Rgb(40, 44, 52),
            danger: Color::Red,
        }
    }
}

impl Theme {
    /// Style for pane titles.
    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Border style for a pane.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Style for the highlighted table row.
    pub fn selected_row(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// The active theme.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}
