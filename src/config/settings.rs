//! Application settings configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the admin REST API (e.g. "https://admin.example.com/api").
    pub api_url: String,
    /// Role string that grants access to the admin screens.
    pub admin_role: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Event loop tick rate in milliseconds.
    pub tick_rate_ms: u64,
    /// How long a keyring session read stays valid, in seconds.
    pub session_refresh_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            admin_role: "Admin".to_string(),
            request_timeout_secs: 30,
            tick_rate_ms: 100,
            session_refresh_secs: 2,
        }
    }
}

impl Settings {
    /// Validate these settings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "api_url '{}' must start with http:// or https://",
                self.api_url
            )));
        }

        if self.admin_role.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "admin_role cannot be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.tick_rate_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_rate_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(Settings::default().validate().is_ok());
        assert_eq!(Settings::default().admin_role, "Admin");
    }

    #[test]
    fn test_empty_url_rejected() {
        let settings = Settings {
            api_url: "".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("api_url cannot be empty"));
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let settings = Settings {
            api_url: "admin.example.com".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("must start with http"));
    }

    #[test]
    fn test_empty_role_rejected() {
        let settings = Settings {
            admin_role: " ".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = Settings {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(r#"api_url = "https://admin.example.com""#).unwrap();
        assert_eq!(settings.api_url, "https://admin.example.com");
        assert_eq!(settings.admin_role, "Admin");
        assert_eq!(settings.tick_rate_ms, 100);
    }
}
