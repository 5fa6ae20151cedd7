//! Help panel listing keyboard shortcuts.
//!
//! Opened with '?' and closed with '?', 'q' or Escape. Scrolls when the
//! terminal is too short for the full list.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::events::{get_keybindings_grouped, KeyContext, Keybinding};
use crate::ui::theme::theme;

/// Actions returned from the help view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

/// The help panel view.
pub struct HelpView {
    grouped_bindings: Vec<(KeyContext, Vec<Keybinding>)>,
    scroll: usize,
    total_lines: usize,
    /// Updated on render.
    visible_height: usize,
}

impl HelpView {
    pub fn new() -> Self {
        let grouped_bindings = get_keybindings_grouped();
        // header and blank line, bindings, trailing blank; then the footer
        let total_lines = grouped_bindings
            .iter()
            .map(|(_, bindings)| bindings.len() + 3)
            .sum::<usize>()
            + 1;

        Self {
            grouped_bindings,
            scroll: 0,
            total_lines,
            visible_height: 0,
        }
    }

    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height)
    }

    /// Handle keyboard input. All keys are consumed while help is open.
    pub fn handle_input(&mut self, key_event: KeyEvent) -> Option<HelpAction> {
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Char('?'), _) | (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => {
                return Some(HelpAction::Close);
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            (KeyCode::PageDown, _) => {
                let page = self.visible_height.saturating_sub(2);
                self.scroll = (self.scroll + page).min(self.max_scroll());
            }
            (KeyCode::PageUp, _) => {
                let page = self.visible_height.saturating_sub(2);
                self.scroll = self.scroll.saturating_sub(page);
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) => self.scroll = 0,
            (KeyCode::Char('G'), _) => self.scroll = self.max_scroll(),
            _ => {}
        }
        None
    }

    /// Render the help panel over `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Help - Keyboard Shortcuts ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.visible_height = inner.height as usize;

        let paragraph = Paragraph::new(self.build_content_lines()).scroll((self.scroll as u16, 0));
        frame.render_widget(paragraph, inner);

        if self.total_lines > self.visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut state = ScrollbarState::new(self.max_scroll()).position(self.scroll);
            let scrollbar_area = Rect::new(
                area.x + area.width.saturating_sub(1),
                area.y + 1,
                1,
                area.height.saturating_sub(2),
            );
            frame.render_stateful_widget(scrollbar, scrollbar_area, &mut state);
        }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let t = theme();
        let mut lines: Vec<Line<'static>> = Vec::with_capacity(self.total_lines);

        for (context, bindings) in &self.grouped_bindings {
            lines.push(Line::from(Span::styled(
                format!("── {} ──", context.display()),
                Style::default()
                    .fg(t.border_focused)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));

            for binding in bindings {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:>16}", binding.key),
                        Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(binding.description),
                ]));
            }

            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            "Press ?, q, or Esc to close",
            Style::default().fg(t.muted),
        )));

        lines
    }
}

impl Default for HelpView {
    fn default() -> Self {
        Self::new()
    }
}
