//! Key binding hints and global shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Where keyboard focus currently is. Selects the hint line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    /// Navigating the cities table.
    CitiesTable,
    /// Typing into the add/edit form.
    CitiesForm,
    /// The country list of the form is open.
    CountrySelect,
    /// Access was denied and the login notice is shown.
    LoginRequired,
    /// The help overlay.
    Help,
}

impl KeyContext {
    /// Heading used in the help panel.
    pub fn display(&self) -> &'static str {
        match self {
            KeyContext::CitiesTable => "Cities",
            KeyContext::CitiesForm => "City form",
            KeyContext::CountrySelect => "Country list",
            KeyContext::LoginRequired => "Login required",
            KeyContext::Help => "Help",
        }
    }
}

/// A documented key binding.
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: &'static str,
    pub description: &'static str,
}

const fn bind(key: &'static str, description: &'static str) -> Keybinding {
    Keybinding { key, description }
}

/// All key bindings, grouped by the context they apply in.
pub fn get_keybindings_grouped() -> Vec<(KeyContext, Vec<Keybinding>)> {
    vec![
        (
            KeyContext::CitiesTable,
            vec![
                bind("j / Down", "Next city"),
                bind("k / Up", "Previous city"),
                bind("g / G", "First / last city"),
                bind("a", "Open the add form"),
                bind("e / Enter", "Edit the selected city"),
                bind("d", "Delete the selected city"),
                bind("r", "Reload cities and countries"),
                bind("Tab", "Focus the open form"),
                bind("?", "Toggle this help"),
                bind("q / Ctrl+C", "Quit"),
            ],
        ),
        (
            KeyContext::CitiesForm,
            vec![
                bind("Tab / Shift+Tab", "Next / previous field"),
                bind("Enter", "Submit (or open the country list)"),
                bind("Ctrl+S", "Submit from any field"),
                bind("Esc", "Back to the table, keeping the draft"),
            ],
        ),
        (
            KeyContext::CountrySelect,
            vec![
                bind("j / k", "Move through countries"),
                bind("Left / Right", "Cycle without opening"),
                bind("Enter", "Choose"),
                bind("Esc", "Close"),
            ],
        ),
        (
            KeyContext::LoginRequired,
            vec![
                bind("r", "Check the session again"),
                bind("q", "Quit"),
            ],
        ),
    ]
}

/// Short hint line for the help bar.
pub fn get_context_hints(context: KeyContext) -> &'static str {
    match context {
        KeyContext::CitiesTable => {
            "[j/k] navigate  [a] add  [e] edit  [d] delete  [r] reload  [?] help  [q] quit"
        }
        KeyContext::CitiesForm => "[Tab] next field  [Enter] submit  [Esc] back to table",
        KeyContext::CountrySelect => "[j/k] choose  [Enter] select  [Esc] close",
        KeyContext::LoginRequired => "[r] retry  [q] quit",
        KeyContext::Help => "[Esc/?] close",
    }
}

/// Ctrl+C quits from anywhere.
pub fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_hints_list_crud_keys() {
        let hints = get_context_hints(KeyContext::CitiesTable);
        for key in ["[a]", "[e]", "[d]", "[r]"] {
            assert!(hints.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_every_context_has_hints() {
        for context in [
            KeyContext::CitiesTable,
            KeyContext::CitiesForm,
            KeyContext::CountrySelect,
            KeyContext::LoginRequired,
            KeyContext::Help,
        ] {
            assert!(!get_context_hints(context).is_empty());
        }
    }

    #[test]
    fn test_grouped_bindings_cover_crud_keys() {
        let grouped = get_keybindings_grouped();
        let table = &grouped
            .iter()
            .find(|(context, _)| *context == KeyContext::CitiesTable)
            .unwrap()
            .1;
        for key in ["a", "d", "r"] {
            assert!(table.iter().any(|b| b.key == key), "missing {}", key);
        }
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
