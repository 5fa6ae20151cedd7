//! Country picker for the city form.
//!
//! Shows the chosen country when collapsed. Enter opens the list,
//! j/k or the arrows move, Enter picks and Esc closes without a change.
//! Left/right cycle through countries without opening the list.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::Country;
use crate::ui::theme::theme;

/// Result of a key press on the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySelectAction {
    /// A country was chosen.
    Select(i64),
    /// The open list was closed without choosing.
    Cancel,
}

/// Country picker.
#[derive(Debug, Default)]
pub struct CountrySelect {
    countries: Vec<Country>,
    /// Chosen country id. May name a country not in the list.
    selected: Option<i64>,
    highlighted: usize,
    expanded: bool,
}

impl CountrySelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the option list. The selection is kept by id.
    pub fn set_countries(&mut self, countries: &[Country]) {
        self.countries = countries.to_vec();
        self.highlighted = self.selected_index().unwrap_or(0);
    }

    /// Choose a country by id; 0 clears the choice.
    pub fn select(&mut self, country_id: i64) {
        self.selected = (country_id != 0).then_some(country_id);
        if let Some(idx) = self.selected_index() {
            self.highlighted = idx;
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.countries.iter().position(|c| c.id == id)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<CountrySelectAction> {
        if self.expanded {
            self.handle_expanded_input(key)
        } else {
            self.handle_collapsed_input(key)
        }
    }

    fn handle_collapsed_input(&mut self, key: KeyEvent) -> Option<CountrySelectAction> {
        if self.countries.is_empty() {
            return None;
        }
        let last = self.countries.len() - 1;
        let next = match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => {
                self.expanded = true;
                self.highlighted = self.selected_index().unwrap_or(0);
                return None;
            }
            (KeyCode::Left, _) => match self.selected_index() {
                Some(idx) if idx > 0 => idx - 1,
                _ => return None,
            },
            (KeyCode::Right, _) => match self.selected_index() {
                Some(idx) if idx < last => idx + 1,
                Some(_) => return None,
                None => 0,
            },
            _ => return None,
        };
        self.pick(next)
    }

    fn handle_expanded_input(&mut self, key: KeyEvent) -> Option<CountrySelectAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if self.highlighted + 1 < self.countries.len() {
                    self.highlighted += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.highlighted = self.highlighted.saturating_sub(1);
                None
            }
            (KeyCode::Enter, KeyModifiers::NONE) => {
                self.expanded = false;
                self.pick(self.highlighted)
            }
            (KeyCode::Esc, _) => {
                self.expanded = false;
                Some(CountrySelectAction::Cancel)
            }
            _ => None,
        }
    }

    fn pick(&mut self, index: usize) -> Option<CountrySelectAction> {
        let country = self.countries.get(index)?;
        self.selected = Some(country.id);
        self.highlighted = index;
        Some(CountrySelectAction::Select(country.id))
    }

    fn display_text(&self) -> String {
        match (self.selected, self.selected_index()) {
            (Some(_), Some(idx)) => self.countries[idx].name.clone(),
            (Some(id), None) => format!("#{}", id),
            (None, _) if self.countries.is_empty() => "No countries loaded".to_string(),
            (None, _) => "Select country...".to_string(),
        }
    }

    /// Render the collapsed field.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let t = theme();
        let text_style = if self.selected.is_some() {
            Style::default().fg(t.input_fg)
        } else {
            Style::default().fg(t.input_placeholder)
        };
        let title_style = if focused {
            Style::default()
                .fg(t.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg)
        };
        let indicator = if self.expanded { "▲" } else { "▼" };

        let block = Block::default()
            .title(Span::styled(" Country ", title_style))
            .borders(Borders::ALL)
            .border_style(t.border_style(focused));

        let paragraph = Paragraph::new(format!("{} {}", self.display_text(), indicator))
            .style(text_style)
            .block(block);
        frame.render_widget(paragraph, area);
    }

    /// Render the open list as an overlay below (or above) the field.
    pub fn render_expanded_list(&self, frame: &mut Frame, field: Rect, screen: Rect) {
        if !self.expanded || self.countries.is_empty() {
            return;
        }
        let t = theme();

        let height = (self.countries.len().min(8) + 2) as u16;
        let below = screen.height.saturating_sub(field.y + field.height);
        let above = field.y.saturating_sub(screen.y);

        let area = if below >= height || below >= above {
            Rect::new(field.x, field.y + field.height - 1, field.width, height.min(below))
        } else {
            let y = field.y.saturating_sub(height - 1);
            Rect::new(field.x, y, field.width, height.min(above))
        };

        frame.render_widget(Clear, area);

        let items: Vec<ListItem> = self
            .countries
            .iter()
            .map(|country| {
                let style = if Some(country.id) == self.selected {
                    Style::default().fg(t.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(t.fg)
                };
                ListItem::new(country.name.clone()).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(t.border_style(true)),
            )
            .highlight_style(t.selected_row())
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.highlighted));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> Vec<Country> {
        vec![
            Country {
                id: 1,
                name: "France".to_string(),
            },
            Country {
                id: 2,
                name: "Spain".to_string(),
            },
            Country {
                id: 3,
                name: "Italy".to_string(),
            },
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_expand_navigate_select() {
        let mut select = CountrySelect::new();
        select.set_countries(&countries());

        assert_eq!(select.handle_input(key(KeyCode::Enter)), None);
        assert!(select.is_expanded());
        select.handle_input(key(KeyCode::Char('j')));
        select.handle_input(key(KeyCode::Char('j')));
        select.handle_input(key(KeyCode::Char('j')));

        assert_eq!(
            select.handle_input(key(KeyCode::Enter)),
            Some(CountrySelectAction::Select(3))
        );
        assert!(!select.is_expanded());
        assert_eq!(select.selected, Some(3));
    }

    #[test]
    fn test_escape_keeps_selection() {
        let mut select = CountrySelect::new();
        select.set_countries(&countries());
        select.select(2);

        select.handle_input(key(KeyCode::Enter));
        select.handle_input(key(KeyCode::Down));
        assert_eq!(
            select.handle_input(key(KeyCode::Esc)),
            Some(CountrySelectAction::Cancel)
        );
        assert_eq!(select.selected, Some(2));
    }

    #[test]
    fn test_cycle_without_expanding() {
        let mut select = CountrySelect::new();
        select.set_countries(&countries());

        assert_eq!(
            select.handle_input(key(KeyCode::Right)),
            Some(CountrySelectAction::Select(1))
        );
        assert_eq!(
            select.handle_input(key(KeyCode::Right)),
            Some(CountrySelectAction::Select(2))
        );
        assert_eq!(
            select.handle_input(key(KeyCode::Left)),
            Some(CountrySelectAction::Select(1))
        );
        assert_eq!(select.handle_input(key(KeyCode::Left)), None);
    }

    #[test]
    fn test_unknown_country_shown_by_id() {
        let mut select = CountrySelect::new();
        select.set_countries(&countries());
        select.select(42);
        assert_eq!(select.display_text(), "#42");
    }

    #[test]
    fn test_zero_clears_selection() {
        let mut select = CountrySelect::new();
        select.set_countries(&countries());
        select.select(1);
        select.select(0);
        assert_eq!(select.selected, None);
        assert_eq!(select.display_text(), "Select country...");
    }

    #[test]
    fn test_empty_list_ignores_keys() {
        let mut select = CountrySelect::new();
        assert_eq!(select.handle_input(key(KeyCode::Enter)), None);
        assert!(!select.is_expanded());
        assert_eq!(select.display_text(), "No countries loaded");
    }
}
