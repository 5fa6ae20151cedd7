//! cityadmin - a terminal console for administering cities and countries.
//!
//! Runs the cities screen against the admin REST API, or manages the stored
//! session with the `session` subcommand.

mod api;
mod app;
mod cities;
mod config;
mod error;
mod events;
mod logging;
mod tasks;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::auth;
use crate::api::{CityBackend, CityClient, TokenSource};
use crate::app::App;
use crate::config::{Config, KeyringSession, SessionContext, Settings, StaticSession};
use crate::error::AppError;
use crate::events::EventHandler;
use crate::tasks::{create_task_channel, ApiMessage, TaskSpawner};

#[derive(Debug, Parser)]
#[command(name = "cityadmin", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the API base URL from the configuration.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Use this session token for this run instead of the keyring.
    #[arg(long, requires = "role", value_name = "TOKEN")]
    token: Option<String>,

    /// Role that goes with --token.
    #[arg(long, requires = "token", value_name = "ROLE")]
    role: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the session stored in the OS keyring.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Write a configuration file with the current settings.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location.
    Path,
}

#[derive(Debug, Subcommand)]
enum SessionAction {
    /// Store a session token and role.
    Set {
        #[arg(long)]
        token: String,
        #[arg(long)]
        role: String,
    },
    /// Remove the stored session.
    Clear,
    /// Show whether a session is stored.
    Show,
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    let result = match cli.command {
        Some(Commands::Session { ref action }) => run_session(&cli, action),
        Some(Commands::Config { ref action }) => run_config(&cli, action),
        None => run_console(&cli).await,
    };

    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    logging::shutdown();
    result
}

/// Turn a startup error into a message with its suggested fix.
fn startup_error(error: AppError) -> anyhow::Error {
    let mut message = error.user_message();
    if let Some(action) = error.suggested_action() {
        message = format!("{}\n  {}", message, action);
    }
    anyhow::Error::new(error).context(message)
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Config::default_path().map_err(|e| startup_error(e.into())),
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let path = config_path(cli)?;
    let mut settings = Config::load_from(&path)
        .map_err(|e| startup_error(e.into()))?
        .settings;

    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
        settings.validate().map_err(|e| startup_error(e.into()))?;
    }
    Ok(settings)
}

fn run_session(cli: &Cli, action: &SessionAction) -> anyhow::Result<()> {
    match action {
        SessionAction::Set { token, role } => {
            auth::store_session(token, role).map_err(|e| startup_error(e.into()))?;
            info!(role = %role, "Session stored");
            println!("Session stored for role '{}'.", role);
        }
        SessionAction::Clear => {
            auth::clear_session().map_err(|e| startup_error(e.into()))?;
            info!("Session cleared");
            println!("Session cleared.");
        }
        SessionAction::Show => {
            let settings = load_settings(cli)?;
            let session = KeyringSession::new(&settings.admin_role, Duration::ZERO);
            let role = auth::get_role().map_err(|e| startup_error(e.into()))?;

            println!("API URL:  {}", settings.api_url);
            println!(
                "Token:    {}",
                if session.is_authenticated() { "stored" } else { "none" }
            );
            println!("Role:     {}", role.as_deref().unwrap_or("none"));
            println!(
                "Access:   {}",
                if session.is_authenticated() && session.is_admin() {
                    "granted"
                } else {
                    "login required"
                }
            );
            if let Some(dir) = logging::log_directory() {
                println!("Logs:     {}", dir.display());
            }
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, action: &ConfigAction) -> anyhow::Result<()> {
    let path = config_path(cli)?;
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists\n  Pass --force to overwrite it.",
                    path.display()
                );
            }
            let config = Config {
                settings: load_settings(cli)?,
            };
            config.save_to(&path).map_err(|e| startup_error(e.into()))?;
            info!(path = %path.display(), "Configuration written");
            println!("Wrote {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

async fn run_console(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli)?;

    let (session, tokens): (Arc<dyn SessionContext>, Arc<dyn TokenSource>) =
        match (&cli.token, &cli.role) {
            (Some(token), Some(role)) => {
                info!("Using session from the command line");
                let session = Arc::new(StaticSession::new(
                    Some(token),
                    Some(role),
                    &settings.admin_role,
                ));
                let guard: Arc<dyn SessionContext> = session.clone();
                let tokens: Arc<dyn TokenSource> = session;
                (guard, tokens)
            }
            _ => {
                let session = Arc::new(KeyringSession::new(
                    &settings.admin_role,
                    Duration::from_secs(settings.session_refresh_secs),
                ));
                let guard: Arc<dyn SessionContext> = session.clone();
                let tokens: Arc<dyn TokenSource> = session;
                (guard, tokens)
            }
        };
    let client = CityClient::from_settings(&settings, tokens).map_err(|e| startup_error(e.into()))?;
    info!(api_url = client.base_url(), "Admin API client ready");

    let backend: Arc<dyn CityBackend> = Arc::new(client);
    let (mut rx, spawner) = create_task_channel(backend);
    let mut app = App::new(&settings, session);
    let events = EventHandler::with_tick_rate(settings.tick_rate_ms);

    let mut terminal = setup_terminal().map_err(|e| {
        startup_error(AppError::terminal(format!("failed to set up the terminal: {}", e)))
    })?;
    install_panic_hook();

    let result = run_loop(&mut terminal, &mut app, &mut rx, &spawner, &events);

    restore_terminal(&mut terminal).map_err(|e| {
        startup_error(AppError::terminal(format!("failed to restore the terminal: {}", e)))
    })?;
    result.map_err(startup_error)
}

/// Dispatch queued commands, apply finished tasks, draw, then wait for input.
fn run_loop(
    terminal: &mut Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<ApiMessage>,
    spawner: &TaskSpawner,
    events: &EventHandler,
) -> Result<(), AppError> {
    loop {
        for (command, generation) in app.take_commands() {
            spawner.spawn(command, generation);
        }
        while let Ok(message) = rx.try_recv() {
            app.handle_api_message(message);
        }

        terminal.draw(|frame| app.view(frame))?;

        // crossterm polling blocks; keep the runtime's other workers free
        let event = tokio::task::block_in_place(|| events.next())?;
        app.update(event);

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Leave the alternate screen before a panic message is printed.
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_console_flags() {
        let cli = Cli::try_parse_from([
            "cityadmin",
            "--api-url",
            "https://admin.example.com/api",
            "--token",
            "abc",
            "--role",
            "Admin",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("https://admin.example.com/api"));
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_token_requires_role() {
        assert!(Cli::try_parse_from(["cityadmin", "--token", "abc"]).is_err());
    }

    #[test]
    fn test_cli_session_set() {
        let cli =
            Cli::try_parse_from(["cityadmin", "session", "set", "--token", "t", "--role", "Admin"])
                .unwrap();
        match cli.command {
            Some(Commands::Session {
                action: SessionAction::Set { token, role },
            }) => {
                assert_eq!(token, "t");
                assert_eq!(role, "Admin");
            }
            other => panic!("Expected session set, got {:?}", other),
        }
    }

    #[test]
    fn test_load_settings_applies_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "cityadmin",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "https://admin.example.com/api",
        ])
        .unwrap();

        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.api_url, "https://admin.example.com/api");
        assert_eq!(settings.admin_role, "Admin");
    }

    #[test]
    fn test_config_init_writes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cli = Cli::try_parse_from([
            "cityadmin",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "https://admin.example.com/api",
            "config",
            "init",
        ])
        .unwrap();
        let Some(Commands::Config { action }) = &cli.command else {
            panic!("Expected config subcommand");
        };

        run_config(&cli, action).unwrap();
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.settings.api_url, "https://admin.example.com/api");

        assert!(run_config(&cli, action).is_err());
    }

    #[test]
    fn test_load_settings_rejects_bad_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "cityadmin",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "admin.example.com",
        ])
        .unwrap();

        let err = load_settings(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("api_url"));
    }
}
