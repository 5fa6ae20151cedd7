//! Admin-only access check for the cities screen.

use tracing::info;

use crate::config::SessionContext;

/// Where a rejected visitor is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
}

/// Decides whether the current session may see the cities screen.
pub struct AccessGuard;

impl AccessGuard {
    /// `None` when the session holds a token and the admin role,
    /// otherwise a redirect to the login screen.
    pub fn check(session: &dyn SessionContext) -> Option<Redirect> {
        if session.is_authenticated() && session.is_admin() {
            return None;
        }
        info!(
            authenticated = session.is_authenticated(),
            "Access to cities screen denied"
        );
        Some(Redirect::Login)
    }
}
