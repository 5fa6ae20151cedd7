//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA): `update` consumes
//! events and API results, `view` renders, and remote work leaves the app
//! only as queued commands picked up by the main loop.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::cities::{AccessGuard, CityAdmin, Command, Generation, Outcome, Redirect};
use crate::config::{SessionContext, Settings};
use crate::error::AppError;
use crate::events::{is_quit, Event, KeyContext};
use crate::tasks::ApiMessage;
use crate::ui::{
    render_context_help, render_login_required, theme::theme, CitiesAction, CitiesView,
    HelpAction, HelpView, NotificationManager,
};

/// The current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// The cities table and form.
    Cities,
    /// The access guard sent us away from the cities screen.
    LoginRequired,
    /// Help overlay on top of the cities screen.
    Help,
    /// Application is in the process of exiting.
    Exiting,
}

/// The main application struct that holds all state.
pub struct App {
    state: AppState,
    should_quit: bool,
    admin: CityAdmin,
    cities_view: CitiesView,
    help_view: HelpView,
    notifications: NotificationManager,
    session: Arc<dyn SessionContext>,
    admin_role: String,
    api_url: String,
    /// Commands waiting for the main loop, tagged with their generation.
    pending: Vec<(Command, Generation)>,
}

impl App {
    /// Create the application and try to open the cities screen.
    pub fn new(settings: &Settings, session: Arc<dyn SessionContext>) -> Self {
        debug!("Creating application instance");
        let mut app = Self {
            state: AppState::LoginRequired,
            should_quit: false,
            admin: CityAdmin::new(),
            cities_view: CitiesView::new(),
            help_view: HelpView::new(),
            notifications: NotificationManager::default(),
            session,
            admin_role: settings.admin_role.clone(),
            api_url: settings.api_url.clone(),
            pending: Vec::new(),
        };
        app.enter_cities();
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drain the commands queued since the last call.
    pub fn take_commands(&mut self) -> Vec<(Command, Generation)> {
        std::mem::take(&mut self.pending)
    }

    fn queue(&mut self, commands: impl IntoIterator<Item = Command>) {
        let generation = self.admin.generation();
        self.pending
            .extend(commands.into_iter().map(|command| (command, generation)));
    }

    // ------------------------------------------------------------------
    // Screen lifecycle
    // ------------------------------------------------------------------

    /// Mount the cities screen if the session allows it.
    ///
    /// Returns whether the screen is now shown.
    fn enter_cities(&mut self) -> bool {
        if let Some(redirect) = AccessGuard::check(self.session.as_ref()) {
            self.follow(redirect);
            return false;
        }
        self.cities_view.reset();
        let commands = self.admin.mount();
        self.queue(commands);
        self.state = AppState::Cities;
        info!("Cities screen opened");
        true
    }

    fn follow(&mut self, redirect: Redirect) {
        match redirect {
            Redirect::Login => {
                if self.admin.is_mounted() {
                    warn!("Session no longer allows the cities screen; redirecting to login");
                }
                self.admin.unmount();
                self.cities_view.reset();
                self.state = AppState::LoginRequired;
            }
        }
    }

    /// Re-run the access guard while the cities screen is visible.
    fn enforce_access(&mut self) {
        if !matches!(self.state, AppState::Cities | AppState::Help) {
            return;
        }
        if let Some(redirect) = AccessGuard::check(self.session.as_ref()) {
            self.follow(redirect);
            self.notifications.warning("Your session ended. Please log in again.");
        }
    }

    fn quit(&mut self) {
        info!("Quit requested");
        self.admin.unmount();
        self.should_quit = true;
        self.state = AppState::Exiting;
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// Report an error as a toast.
    ///
    /// Critical errors carry their suggested action; recoverable ones are
    /// shown as warnings.
    pub fn handle_error(&mut self, error: &AppError) {
        let mut message = error.user_message();
        if let Some(action) = error.suggested_action() {
            message = format!("{} {}", message, action);
        }

        if error.is_critical() {
            warn!(error = %error, "Critical error");
            self.notifications.error(message);
        } else if error.is_recoverable() {
            warn!(error = %error, "Recoverable error");
            self.notifications.warning(message);
        } else {
            warn!(error = %error, "Request failed");
            self.notifications.error(message);
        }
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update the application state based on an event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(),
        }
    }

    fn handle_tick(&mut self) {
        self.notifications.tick();
        if self.admin.is_busy() {
            self.cities_view.tick();
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        if is_quit(&key) {
            self.quit();
            return;
        }

        match self.state {
            AppState::Cities => {
                if let Some(action) = self.cities_view.handle_input(key, &self.admin) {
                    self.apply_action(action);
                }
            }
            AppState::Help => {
                if let Some(HelpAction::Close) = self.help_view.handle_input(key) {
                    self.state = AppState::Cities;
                }
            }
            AppState::LoginRequired => match (key.code, key.modifiers) {
                (KeyCode::Char('r'), KeyModifiers::NONE) => {
                    self.session.refresh();
                    if !self.enter_cities() {
                        self.notifications
                            .warning(format!("Still no session with the '{}' role.", self.admin_role));
                    }
                }
                (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => self.quit(),
                _ => {}
            },
            AppState::Exiting => {}
        }
    }

    fn apply_action(&mut self, action: CitiesAction) {
        debug!(?action, "Cities action");
        match action {
            CitiesAction::Add => {
                self.admin.open_add();
                self.cities_view
                    .load_draft(self.admin.draft(), self.admin.countries());
            }
            CitiesAction::Edit(city) => {
                self.admin.open_edit(&city);
                self.cities_view
                    .load_draft(self.admin.draft(), self.admin.countries());
            }
            CitiesAction::Delete(id) => {
                let command = self.admin.delete(id);
                self.queue([command]);
            }
            CitiesAction::Reload => {
                self.notifications.info("Reloading cities and countries");
                let commands = self.admin.reload();
                self.queue(commands);
            }
            CitiesAction::Submit => {
                if let Some(command) = self.admin.submit() {
                    self.queue([command]);
                    self.cities_view.form_closed();
                }
            }
            CitiesAction::SetName(value) => self.admin.set_name(value),
            CitiesAction::SetDetailedName(value) => self.admin.set_detailed_name(value),
            CitiesAction::SetIataCode(value) => self.admin.set_iata_code(value),
            CitiesAction::SetCountry(id) => self.admin.set_country_id(id),
            CitiesAction::ShowHelp => {
                self.help_view.reset_scroll();
                self.state = AppState::Help;
            }
            CitiesAction::Quit => self.quit(),
        }
    }

    /// Handle a result from a background task.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        let generation = message.generation();
        if !self.admin.is_mounted() || generation != self.admin.generation() {
            debug!(
                generation,
                current = self.admin.generation(),
                "Ignoring result for a closed screen"
            );
            return;
        }

        match message {
            ApiMessage::CitiesFetched { result, .. } => match result {
                Ok(cities) => self.apply(generation, Outcome::CitiesLoaded(cities)),
                Err(e) => self.fail(generation, e.into()),
            },
            ApiMessage::CountriesFetched { result, .. } => match result {
                Ok(countries) => {
                    self.apply(generation, Outcome::CountriesLoaded(countries));
                    self.cities_view.set_countries(self.admin.countries());
                }
                Err(e) => self.fail(generation, e.into()),
            },
            ApiMessage::CityCreated { result, .. } => match result {
                Ok(city) => {
                    info!(%city, "City created");
                    self.notifications.success(format!("Created {}", city));
                    self.apply(generation, Outcome::Mutated);
                }
                Err(e) => self.fail(generation, e.into()),
            },
            ApiMessage::CityUpdated { id, result, .. } => match result {
                Ok(city) => {
                    info!(id, "City updated");
                    self.notifications.success(format!("Saved {}", city));
                    self.apply(generation, Outcome::Mutated);
                }
                Err(e) => self.fail(generation, e.into()),
            },
            ApiMessage::CityDeleted { id, result, .. } => match result {
                Ok(()) => {
                    info!(id, "City deleted");
                    self.notifications.success(format!("Deleted city #{}", id));
                    self.apply(generation, Outcome::Mutated);
                }
                Err(e) => self.fail(generation, e.into()),
            },
        }
    }

    fn apply(&mut self, generation: Generation, outcome: Outcome) {
        let follow_up = self.admin.apply(generation, outcome);
        self.queue(follow_up);
    }

    fn fail(&mut self, generation: Generation, error: AppError) {
        self.admin.request_failed(generation);
        self.handle_error(&error);
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    /// Render the application UI.
    ///
    /// The access guard runs first, so a session that ended while the
    /// screen was open redirects on the next frame.
    pub fn view(&mut self, frame: &mut Frame) {
        self.enforce_access();

        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);

        match self.state {
            AppState::Cities => self.cities_view.render(frame, chunks[1], &self.admin),
            AppState::Help => {
                self.cities_view.render(frame, chunks[1], &self.admin);
                self.help_view.render(frame, inset(chunks[1], 4, 2));
            }
            AppState::LoginRequired => render_login_required(frame, chunks[1], &self.admin_role),
            AppState::Exiting => {}
        }

        render_context_help(frame, chunks[2], self.key_context());
        self.notifications.render(frame, area);
    }

    fn key_context(&self) -> KeyContext {
        match self.state {
            AppState::Cities | AppState::Exiting => self.cities_view.key_context(self.admin.mode()),
            AppState::Help => KeyContext::Help,
            AppState::LoginRequired => KeyContext::LoginRequired,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let line = Line::from(vec![
            Span::styled(
                " cityadmin ",
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {} ", self.api_url), Style::default().fg(t.muted)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Shrink a rectangle by a margin on each side.
fn inset(area: Rect, horizontal: u16, vertical: u16) -> Rect {
    Rect::new(
        area.x + horizontal.min(area.width / 2),
        area.y + vertical.min(area.height / 2),
        area.width.saturating_sub(horizontal * 2),
        area.height.saturating_sub(vertical * 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    use crate::api::{ApiError, City, Country, InMemoryBackend, NewCity};
    use crate::cities::FormMode;
    use crate::config::StaticSession;
    use crate::tasks::{create_task_channel, TaskSpawner};

    /// A session whose admin status can be flipped mid-test.
    struct ToggleSession {
        allowed: AtomicBool,
    }

    impl ToggleSession {
        fn new(allowed: bool) -> Arc<Self> {
            Arc::new(Self {
                allowed: AtomicBool::new(allowed),
            })
        }

        fn set(&self, allowed: bool) {
            self.allowed.store(allowed, Ordering::SeqCst);
        }
    }

    impl SessionContext for ToggleSession {
        fn is_authenticated(&self) -> bool {
            self.allowed.load(Ordering::SeqCst)
        }

        fn is_admin(&self) -> bool {
            self.allowed.load(Ordering::SeqCst)
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.update(key(KeyCode::Char(c)));
        }
    }

    fn city(id: i64, name: &str, iata: &str) -> City {
        City {
            id: Some(id),
            name: name.to_string(),
            detailed_name: format!("{}, France", name),
            iata_code: iata.to_string(),
            country_id: 1,
        }
    }

    fn admin_app() -> App {
        App::new(&Settings::default(), Arc::new(StaticSession::admin()))
    }

    /// An app whose initial loads have landed.
    fn loaded_app(cities: Vec<City>) -> App {
        let mut app = admin_app();
        let generation = app.admin.generation();
        app.take_commands();
        app.handle_api_message(ApiMessage::CitiesFetched {
            generation,
            result: Ok(cities),
        });
        app.handle_api_message(ApiMessage::CountriesFetched {
            generation,
            result: Ok(vec![Country {
                id: 1,
                name: "France".to_string(),
            }]),
        });
        app
    }

    fn france() -> Vec<Country> {
        vec![Country {
            id: 1,
            name: "France".to_string(),
        }]
    }

    /// An admin app wired to an in-memory backend holding `cities`.
    fn backed_app(
        cities: Vec<City>,
    ) -> (App, TaskSpawner, mpsc::UnboundedReceiver<ApiMessage>) {
        let backend = Arc::new(InMemoryBackend::new(cities, france()));
        let (rx, spawner) = create_task_channel(backend);
        (admin_app(), spawner, rx)
    }

    /// Run queued commands and feed their results back until nothing is queued.
    async fn run_pending(
        app: &mut App,
        spawner: &TaskSpawner,
        rx: &mut mpsc::UnboundedReceiver<ApiMessage>,
    ) {
        loop {
            let commands = app.take_commands();
            if commands.is_empty() {
                return;
            }
            let count = commands.len();
            for (command, generation) in commands {
                spawner.spawn(command, generation);
            }
            for _ in 0..count {
                let message = rx.recv().await.expect("task channel closed");
                app.handle_api_message(message);
            }
        }
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_admin_session_mounts_and_loads() {
        let mut app = admin_app();
        assert_eq!(app.state, AppState::Cities);
        assert_eq!(
            app.take_commands(),
            vec![(Command::LoadCities, 1), (Command::LoadCountries, 1)]
        );
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_anonymous_session_redirected() {
        let mut app = App::new(&Settings::default(), Arc::new(StaticSession::anonymous()));
        assert_eq!(app.state, AppState::LoginRequired);
        assert!(app.take_commands().is_empty());
        assert!(draw(&mut app).contains("Login required"));
    }

    #[test]
    fn test_non_admin_role_redirected() {
        let session = StaticSession::new(Some("token"), Some("Viewer"), "Admin");
        let app = App::new(&Settings::default(), Arc::new(session));
        assert_eq!(app.state, AppState::LoginRequired);
    }

    #[test]
    fn test_add_city_end_to_end() {
        let mut app = loaded_app(vec![]);

        app.update(key(KeyCode::Char('a')));
        assert_eq!(app.admin.mode(), FormMode::Adding);
        type_str(&mut app, "Paris");
        app.update(key(KeyCode::Tab));
        type_str(&mut app, "Paris, France");
        app.update(key(KeyCode::Tab));
        type_str(&mut app, "PAR");
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::Right));
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));

        let generation = app.admin.generation();
        assert_eq!(
            app.take_commands(),
            vec![(
                Command::CreateCity(NewCity {
                    name: "Paris".to_string(),
                    detailed_name: "Paris, France".to_string(),
                    iata_code: "PAR".to_string(),
                    country_id: 1,
                }),
                generation
            )]
        );
        assert_eq!(app.admin.mode(), FormMode::List);

        app.handle_api_message(ApiMessage::CityCreated {
            generation,
            result: Ok(city(1, "Paris", "PAR")),
        });
        assert_eq!(app.take_commands(), vec![(Command::LoadCities, generation)]);
        assert_eq!(app.admin.mode(), FormMode::List);
        assert!(!app.notifications.is_empty());

        app.handle_api_message(ApiMessage::CitiesFetched {
            generation,
            result: Ok(vec![city(1, "Paris", "PAR")]),
        });
        assert_eq!(app.admin.cities().len(), 1);
    }

    #[test]
    fn test_edit_changes_only_iata_code() {
        let mut app = loaded_app(vec![city(5, "Paris", "PAR"), city(6, "Lyon", "LYS")]);

        app.update(key(KeyCode::Char('e')));
        assert_eq!(app.admin.mode(), FormMode::Editing { id: 5 });
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::Tab));
        for _ in 0..3 {
            app.update(key(KeyCode::Backspace));
        }
        type_str(&mut app, "ORY");
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));

        match app.take_commands().as_slice() {
            [(Command::UpdateCity(updated), _)] => {
                assert_eq!(updated.id, Some(5));
                assert_eq!(updated.iata_code, "ORY");
                assert_eq!(updated.name, "Paris");
            }
            other => panic!("Expected one UpdateCity, got {:?}", other),
        }
    }

    #[test]
    fn test_iata_code_sent_as_typed() {
        let mut app = loaded_app(vec![]);

        app.update(key(KeyCode::Char('a')));
        type_str(&mut app, "heathrow");
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::Tab));
        type_str(&mut app, "lhr-X");
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));

        match app.take_commands().as_slice() {
            [(Command::CreateCity(created), _)] => {
                assert_eq!(created.name, "heathrow");
                assert_eq!(created.detailed_name, "");
                assert_eq!(created.iata_code, "lhr-X");
                assert_eq!(created.country_id, 0);
            }
            other => panic!("Expected one CreateCity, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_keeps_form_mode() {
        let mut app = loaded_app(vec![city(5, "Paris", "PAR"), city(7, "Nice", "NCE")]);

        app.update(key(KeyCode::Char('a')));
        app.update(key(KeyCode::Esc));
        app.update(key(KeyCode::Char('j')));
        app.update(key(KeyCode::Char('d')));

        let generation = app.admin.generation();
        assert_eq!(app.take_commands(), vec![(Command::DeleteCity(7), generation)]);
        assert_eq!(app.admin.mode(), FormMode::Adding);

        app.handle_api_message(ApiMessage::CityDeleted {
            generation,
            id: 7,
            result: Ok(()),
        });
        assert_eq!(app.take_commands(), vec![(Command::LoadCities, generation)]);
        assert_eq!(app.admin.mode(), FormMode::Adding);
    }

    #[tokio::test]
    async fn test_edit_reload_changes_only_that_record() {
        let lyon = city(6, "Lyon", "LYS");
        let (mut app, spawner, mut rx) = backed_app(vec![city(5, "Paris", "PAR"), lyon.clone()]);
        run_pending(&mut app, &spawner, &mut rx).await;
        assert_eq!(app.admin.cities().len(), 2);

        app.update(key(KeyCode::Char('e')));
        app.update(key(KeyCode::Tab));
        app.update(key(KeyCode::Tab));
        for _ in 0..3 {
            app.update(key(KeyCode::Backspace));
        }
        type_str(&mut app, "ORY");
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        run_pending(&mut app, &spawner, &mut rx).await;

        let cities = app.admin.cities();
        assert_eq!(cities.len(), 2);
        let paris = cities.iter().find(|c| c.id == Some(5)).unwrap();
        assert_eq!(paris.iata_code, "ORY");
        assert_eq!(paris.name, "Paris");
        assert_eq!(paris.detailed_name, "Paris, France");
        assert_eq!(paris.country_id, 1);
        assert_eq!(cities.iter().find(|c| c.id == Some(6)), Some(&lyon));
        assert_eq!(app.admin.mode(), FormMode::List);
        assert!(!app.admin.is_busy());
    }

    #[tokio::test]
    async fn test_deleted_city_gone_after_reload() {
        let (mut app, spawner, mut rx) =
            backed_app(vec![city(5, "Paris", "PAR"), city(7, "Nice", "NCE")]);
        run_pending(&mut app, &spawner, &mut rx).await;

        app.update(key(KeyCode::Char('a')));
        app.update(key(KeyCode::Esc));
        app.update(key(KeyCode::Char('j')));
        app.update(key(KeyCode::Char('d')));
        run_pending(&mut app, &spawner, &mut rx).await;

        let ids: Vec<Option<i64>> = app.admin.cities().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(5)]);
        assert_eq!(app.admin.mode(), FormMode::Adding);
        assert!(!app.admin.is_busy());
    }

    #[test]
    fn test_failed_mutation_shows_toast_without_rollback() {
        let mut app = loaded_app(vec![city(5, "Paris", "PAR")]);
        app.update(key(KeyCode::Char('a')));
        type_str(&mut app, "Bordeaux");
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        let generation = app.admin.generation();
        app.take_commands();

        app.handle_api_message(ApiMessage::CityCreated {
            generation,
            result: Err(ApiError::ServerError("HTTP 500".to_string())),
        });

        assert!(app.take_commands().is_empty());
        assert_eq!(app.admin.mode(), FormMode::List);
        assert_eq!(app.admin.cities().len(), 1);
        assert!(!app.admin.is_busy());
        assert!(!app.notifications.is_empty());
    }

    #[test]
    fn test_session_revoked_redirects_on_next_render() {
        let session = ToggleSession::new(true);
        let mut app = App::new(&Settings::default(), session.clone());
        let first_generation = app.admin.generation();
        app.take_commands();
        app.update(key(KeyCode::Char('a')));

        session.set(false);
        let screen = draw(&mut app);
        assert_eq!(app.state, AppState::LoginRequired);
        assert!(!app.admin.is_mounted());
        assert!(screen.contains("Login required"));

        // A late response for the closed screen is dropped.
        app.handle_api_message(ApiMessage::CitiesFetched {
            generation: first_generation,
            result: Ok(vec![city(1, "Paris", "PAR")]),
        });
        assert!(app.admin.cities().is_empty());

        app.update(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::LoginRequired);

        session.set(true);
        app.update(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Cities);
        assert_eq!(app.admin.mode(), FormMode::List);
        let commands = app.take_commands();
        assert_eq!(commands.len(), 2);
        assert!(commands.iter().all(|(_, g)| *g == first_generation + 1));
    }

    #[test]
    fn test_stale_generation_result_ignored_after_remount() {
        let session = ToggleSession::new(true);
        let mut app = App::new(&Settings::default(), session.clone());
        let old = app.admin.generation();
        session.set(false);
        draw(&mut app);
        session.set(true);
        app.update(key(KeyCode::Char('r')));

        app.handle_api_message(ApiMessage::CitiesFetched {
            generation: old,
            result: Ok(vec![city(9, "Ghost", "GHO")]),
        });
        assert!(app.admin.cities().is_empty());
    }

    #[test]
    fn test_load_failure_reported() {
        let mut app = admin_app();
        let generation = app.admin.generation();
        app.handle_api_message(ApiMessage::CitiesFetched {
            generation,
            result: Err(ApiError::Unauthorized),
        });
        let message = &app.notifications.iter().next().unwrap().message;
        assert!(message.contains("session set"));
    }

    #[test]
    fn test_reload_key_queues_both_lists() {
        let mut app = loaded_app(vec![]);
        app.update(key(KeyCode::Char('r')));
        let commands: Vec<Command> = app.take_commands().into_iter().map(|(c, _)| c).collect();
        assert_eq!(commands, vec![Command::LoadCities, Command::LoadCountries]);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = admin_app();
        app.update(key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Help);
        assert!(draw(&mut app).contains("Keyboard Shortcuts"));
        app.update(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Cities);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = admin_app();
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
        assert_eq!(app.state, AppState::Exiting);

        let mut app = admin_app();
        app.update(key(KeyCode::Char('a')));
        app.update(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_shows_rows() {
        let mut app = loaded_app(vec![city(5, "Paris", "PAR")]);
        let screen = draw(&mut app);
        assert!(screen.contains("Paris"));
        assert!(screen.contains("France"));
        assert!(screen.contains("[a]"));
    }
}
