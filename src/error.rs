//! Centralized error types for cityadmin.
//!
//! `AppError` gathers the library-level errors and turns them into messages
//! fit for a toast or for stderr.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors while drawing or reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup or restore failed.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// A message suitable for showing to users, without technical detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find the configuration directory.".to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read the configuration file. Check that it is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "The configuration file is not valid TOML.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Api(e) => match e {
                ApiError::Unauthorized => "The server rejected your session token.".to_string(),
                ApiError::Forbidden => {
                    "Access denied. The administrator role is required.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' was not found.", resource),
                ApiError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ApiError::ServerError(_) => "Server error. Please try again later.".to_string(),
                ApiError::Network(_) => {
                    "Connection failed. Check your network and the API URL.".to_string()
                }
                ApiError::InvalidUrl(url) => format!("Invalid API URL '{}'.", url),
                ApiError::Keyring(_) => "Could not access secure storage.".to_string(),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the server.".to_string()
                }
                ApiError::MissingId => "Only saved cities can be edited.".to_string(),
                ApiError::Conflict(msg) => format!("Rejected by the server: {}", msg),
            },
            AppError::Io(_) => "Lost contact with the terminal.".to_string(),
            AppError::Terminal(msg) => format!("Terminal error: {}", msg),
        }
    }

    /// Whether the error blocks further work until the user acts.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Api(ApiError::Unauthorized)
                | AppError::Api(ApiError::Forbidden)
                | AppError::Api(ApiError::InvalidUrl(_))
                | AppError::Api(ApiError::Keyring(_))
                | AppError::Io(_)
                | AppError::Terminal(_)
        )
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(e) => e.is_transient() || matches!(e, ApiError::NotFound(_)),
            AppError::Config(_) | AppError::Io(_) | AppError::Terminal(_) => false,
        }
    }

    /// What the user can do about it.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ParseError(_) | ConfigError::ValidationError(_)) => {
                Some("Fix the configuration file or pass --config with another path.")
            }
            AppError::Api(ApiError::Unauthorized) => {
                Some("Run `cityadmin session set` with a fresh token.")
            }
            AppError::Api(ApiError::Forbidden) => {
                Some("Sign in with an account that has the admin role.")
            }
            AppError::Api(ApiError::RateLimited) => Some("Wait a few seconds and press 'r'."),
            AppError::Api(ApiError::NotFound(_)) => {
                Some("Someone may have changed it. Press 'r' to reload.")
            }
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::ServerError(_)) => {
                Some("Check the API URL and press 'r' to retry.")
            }
            AppError::Terminal(_) => Some("Run cityadmin in an interactive terminal."),
            _ => None,
        }
    }
}
