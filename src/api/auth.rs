//! Authentication handling for the admin API.
//!
//! Requests are authenticated with a bearer token (a JWT issued by the login
//! service). The token and the user's role are kept in the OS keyring.

use super::error::{ApiError, Result};

/// The keyring service name for cityadmin secrets.
const KEYRING_SERVICE: &str = "cityadmin";

/// Keyring account holding the session token.
const TOKEN_ACCOUNT: &str = "jwt";

/// Keyring account holding the session role.
const ROLE_ACCOUNT: &str = "role";

/// Supplies the bearer token for each request.
///
/// Read on every request, so a session stored while the console is running
/// is picked up without a restart.
pub trait TokenSource: Send + Sync {
    /// The current token, or `None` when no session is stored.
    fn token(&self) -> Option<String>;
}

/// Authentication credentials for the admin API.
#[derive(Clone)]
pub struct Auth {
    /// The complete `Authorization` header value.
    auth_header: String,
}

impl Auth {
    /// Create credentials from a bearer token.
    pub fn bearer(token: &str) -> Self {
        Self {
            auth_header: format!("Bearer {}", token.trim()),
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth").field("auth_header", &"Bearer ***").finish()
    }
}

fn entry(account: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))
}

/// Read one keyring account, mapping "no entry" to `None`.
fn read_account(account: &str) -> Result<Option<String>> {
    match entry(account)?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(ApiError::Keyring(format!(
            "failed to read {}: {}",
            account, e
        ))),
    }
}

/// Store a session (token and role) in the OS keyring.
///
/// # Errors
///
/// Returns an error if either value cannot be written.
pub fn store_session(token: &str, role: &str) -> Result<()> {
    entry(TOKEN_ACCOUNT)?
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))?;
    entry(ROLE_ACCOUNT)?
        .set_password(role)
        .map_err(|e| ApiError::Keyring(format!("failed to store role: {}", e)))?;
    Ok(())
}

/// Retrieve the session token, if any.
pub fn get_token() -> Result<Option<String>> {
    read_account(TOKEN_ACCOUNT)
}

/// Retrieve the session role, if any.
pub fn get_role() -> Result<Option<String>> {
    read_account(ROLE_ACCOUNT)
}

/// Remove the stored session. Missing entries are not an error.
pub fn clear_session() -> Result<()> {
    for account in [TOKEN_ACCOUNT, ROLE_ACCOUNT] {
        match entry(account)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => {
                return Err(ApiError::Keyring(format!(
                    "failed to delete {}: {}",
                    account, e
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let auth = Auth::bearer("abc.def.ghi");
        assert_eq!(auth.header_value(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_bearer_trims_whitespace() {
        let auth = Auth::bearer("  token\n");
        assert_eq!(auth.header_value(), "Bearer token");
    }

    #[test]
    fn test_auth_does_not_expose_token() {
        let auth = Auth::bearer("secret_token");
        let debug_output = format!("{:?}", auth);
        assert!(!debug_output.contains("secret_token"));
    }
}
