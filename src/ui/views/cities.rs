//! The cities screen: a table of cities and the shared add/edit form.
//!
//! The view owns presentation state only (row selection, keyboard focus and
//! the form widgets). Everything the user does is reported as a
//! [`CitiesAction`] for the app to apply to [`CityAdmin`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::{City, Country};
use crate::cities::{CityAdmin, CityDraft, FormMode};
use crate::events::KeyContext;
use crate::ui::components::{CountrySelect, CountrySelectAction, TextInput};
use crate::ui::theme::theme;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitiesAction {
    Add,
    Edit(City),
    Delete(i64),
    Reload,
    Submit,
    SetName(String),
    SetDetailedName(String),
    SetIataCode(String),
    SetCountry(i64),
    ShowHelp,
    Quit,
}

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    Form,
}

/// Fields of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    DetailedName,
    IataCode,
    Country,
    Submit,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Name,
        FormField::DetailedName,
        FormField::IataCode,
        FormField::Country,
        FormField::Submit,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Presentation state of the cities screen.
pub struct CitiesView {
    table_state: TableState,
    focus: Focus,
    field: FormField,
    name: TextInput,
    detailed_name: TextInput,
    iata_code: TextInput,
    country: CountrySelect,
    spinner: usize,
}

impl Default for CitiesView {
    fn default() -> Self {
        Self::new()
    }
}

impl CitiesView {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
            focus: Focus::Table,
            field: FormField::Name,
            name: TextInput::new().with_placeholder("Paris"),
            detailed_name: TextInput::new().with_placeholder("Paris, France"),
            iata_code: TextInput::new().with_placeholder("PAR"),
            country: CountrySelect::new(),
            spinner: 0,
        }
    }

    /// Show the draft in the form and move focus there.
    pub fn load_draft(&mut self, draft: &CityDraft, countries: &[Country]) {
        self.name.set_value(draft.name.as_str());
        self.detailed_name.set_value(draft.detailed_name.as_str());
        self.iata_code.set_value(draft.iata_code.as_str());
        self.country.set_countries(countries);
        self.country.select(draft.country_id);
        self.country.collapse();
        self.focus = Focus::Form;
        self.field = FormField::Name;
    }

    /// Refresh the country options after a country list load.
    pub fn set_countries(&mut self, countries: &[Country]) {
        self.country.set_countries(countries);
    }

    /// The form went away; hand keys back to the table.
    pub fn form_closed(&mut self) {
        self.focus = Focus::Table;
        self.country.collapse();
    }

    /// Forget everything tied to the previous mount.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the loading spinner.
    pub fn tick(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();
    }

    fn effective_focus(&self, mode: FormMode) -> Focus {
        if mode.is_form_open() {
            self.focus
        } else {
            Focus::Table
        }
    }

    /// Context for the hint line.
    pub fn key_context(&self, mode: FormMode) -> KeyContext {
        match self.effective_focus(mode) {
            Focus::Table => KeyContext::CitiesTable,
            Focus::Form if self.country.is_expanded() => KeyContext::CountrySelect,
            Focus::Form => KeyContext::CitiesForm,
        }
    }

    /// Keep the selection inside the current list.
    fn clamp_selection(&mut self, len: usize) {
        match (self.table_state.selected(), len) {
            (_, 0) => self.table_state.select(None),
            (None, _) => self.table_state.select(Some(0)),
            (Some(i), len) if i >= len => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    fn move_selection(&mut self, len: usize, down: bool) {
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    /// Handle a key press.
    pub fn handle_input(&mut self, key: KeyEvent, admin: &CityAdmin) -> Option<CitiesAction> {
        self.clamp_selection(admin.cities().len());
        match self.effective_focus(admin.mode()) {
            Focus::Table => self.handle_table_input(key, admin),
            Focus::Form => self.handle_form_input(key),
        }
    }

    fn handle_table_input(&mut self, key: KeyEvent, admin: &CityAdmin) -> Option<CitiesAction> {
        let cities = admin.cities();
        let selected = self.table_state.selected().and_then(|i| cities.get(i));

        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.move_selection(cities.len(), true);
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.move_selection(cities.len(), false);
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                if !cities.is_empty() {
                    self.table_state.select(Some(0));
                }
                None
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                if !cities.is_empty() {
                    self.table_state.select(Some(cities.len() - 1));
                }
                None
            }
            (KeyCode::Char('a'), KeyModifiers::NONE) => Some(CitiesAction::Add),
            (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
                selected.map(|city| CitiesAction::Edit(city.clone()))
            }
            (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
                selected.and_then(|city| city.id).map(CitiesAction::Delete)
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => Some(CitiesAction::Reload),
            (KeyCode::Tab, _) if admin.mode().is_form_open() => {
                self.focus = Focus::Form;
                None
            }
            (KeyCode::Char('?'), _) => Some(CitiesAction::ShowHelp),
            (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => Some(CitiesAction::Quit),
            _ => None,
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) -> Option<CitiesAction> {
        if self.field == FormField::Country && self.country.is_expanded() {
            return match self.country.handle_input(key)? {
                CountrySelectAction::Select(id) => Some(CitiesAction::SetCountry(id)),
                CountrySelectAction::Cancel => None,
            };
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.focus = Focus::Table;
                return None;
            }
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => return Some(CitiesAction::Submit),
            (KeyCode::Tab, _) | (KeyCode::Down, _) => {
                self.field = self.field.next();
                return None;
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.field = self.field.prev();
                return None;
            }
            _ => {}
        }

        match self.field {
            FormField::Name => {
                edit_text(&mut self.name, key, &mut self.field).map(CitiesAction::SetName)
            }
            FormField::DetailedName => edit_text(&mut self.detailed_name, key, &mut self.field)
                .map(CitiesAction::SetDetailedName),
            FormField::IataCode => {
                edit_text(&mut self.iata_code, key, &mut self.field).map(CitiesAction::SetIataCode)
            }
            FormField::Country => match self.country.handle_input(key)? {
                CountrySelectAction::Select(id) => Some(CitiesAction::SetCountry(id)),
                CountrySelectAction::Cancel => None,
            },
            FormField::Submit => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(CitiesAction::Submit),
                _ => None,
            },
        }
    }

    /// Render the screen.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, admin: &CityAdmin) {
        self.clamp_selection(admin.cities().len());

        let mode = admin.mode();
        let focus = self.effective_focus(mode);

        let body = if mode.is_form_open() {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(area);
            self.render_form(frame, chunks[1], mode, focus == Focus::Form);
            chunks[0]
        } else {
            area
        };

        self.render_table(frame, body, admin, focus == Focus::Table);

        if focus == Focus::Form && self.country.is_expanded() {
            if let Some(field_area) = self.country_field_area(area, mode) {
                let screen = frame.area();
                self.country.render_expanded_list(frame, field_area, screen);
            }
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect, admin: &CityAdmin, focused: bool) {
        let t = theme();

        let mut title = vec![Span::styled(
            format!(" Cities ({}) ", admin.cities().len()),
            t.title(),
        )];
        if admin.is_busy() {
            title.push(Span::styled(
                format!("{} Loading ", SPINNER_FRAMES[self.spinner]),
                Style::default().fg(t.muted),
            ));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(t.border_style(focused));

        if admin.cities().is_empty() {
            let message = if admin.is_busy() {
                "Loading cities..."
            } else {
                "No cities. Press [a] to add one."
            };
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(t.muted))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(["ID", "Name", "Detailed name", "IATA", "Country"])
            .style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows = admin.cities().iter().map(|city| {
            Row::new(vec![
                Cell::from(city.id.map(|id| id.to_string()).unwrap_or_default()),
                Cell::from(city.name.clone()),
                Cell::from(city.detailed_name.clone()),
                Cell::from(city.iata_code.clone()),
                Cell::from(country_label(admin, city.country_id)),
            ])
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(22),
            Constraint::Percentage(38),
            Constraint::Length(6),
            Constraint::Percentage(25),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(t.selected_row())
            .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn form_layout(area: Rect) -> std::rc::Rc<[Rect]> {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner)
    }

    fn country_field_area(&self, area: Rect, mode: FormMode) -> Option<Rect> {
        if !mode.is_form_open() {
            return None;
        }
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        Some(Self::form_layout(chunks[1])[3])
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, mode: FormMode, focused: bool) {
        let t = theme();
        let title = mode.title().unwrap_or_default();

        let block = Block::default()
            .title(Span::styled(format!(" {} ", title), t.title()))
            .borders(Borders::ALL)
            .border_style(t.border_style(focused));
        frame.render_widget(block, area);

        let chunks = Self::form_layout(area);
        let active = |field: FormField| focused && self.field == field;

        self.name
            .render_with_label(frame, chunks[0], "Name", active(FormField::Name));
        self.detailed_name.render_with_label(
            frame,
            chunks[1],
            "Detailed name",
            active(FormField::DetailedName),
        );
        self.iata_code
            .render_with_label(frame, chunks[2], "IATA code", active(FormField::IataCode));
        self.country
            .render(frame, chunks[3], active(FormField::Country));

        let label = match mode {
            FormMode::Editing { .. } => "[ Save ]",
            _ => "[ Create ]",
        };
        let button_style = if active(FormField::Submit) {
            t.selected_row()
        } else {
            Style::default().fg(t.fg)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, button_style)).alignment(Alignment::Center),
            chunks[5],
        );
    }
}

/// Feed a key to a text field. Enter moves to the next field.
///
/// Returns the whole new value when it changed.
fn edit_text(input: &mut TextInput, key: KeyEvent, field: &mut FormField) -> Option<String> {
    if key.code == KeyCode::Enter {
        *field = field.next();
        return None;
    }
    input
        .handle_input(key)
        .then(|| input.value().to_string())
}

fn country_label(admin: &CityAdmin, country_id: i64) -> String {
    match admin.country_name(country_id) {
        Some(name) => name.to_string(),
        None if country_id == 0 => String::new(),
        None => format!("#{}", country_id),
    }
}
