//! Session context consulted by the access guard.
//!
//! The console never writes the session; it only asks whether a token is
//! present and whether the stored role is the administrative one.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::api::auth::{self, TokenSource};

/// What the access guard needs to know about the current session.
pub trait SessionContext: Send + Sync {
    /// Whether a non-empty session token is stored.
    fn is_authenticated(&self) -> bool;

    /// Whether the stored role equals the administrative role.
    fn is_admin(&self) -> bool;

    /// Forget any cached read so the next query sees the current session.
    fn refresh(&self) {}
}

/// A point-in-time copy of the stored session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub role: Option<String>,
}

impl SessionSnapshot {
    fn has_token(&self) -> bool {
        self.bearer_token().is_some()
    }

    fn bearer_token(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn has_role(&self, admin_role: &str) -> bool {
        self.role.as_deref() == Some(admin_role)
    }
}

/// A fixed session, for tests and for sessions passed on the command line.
#[derive(Debug, Clone)]
pub struct StaticSession {
    snapshot: SessionSnapshot,
    admin_role: String,
}

impl StaticSession {
    pub fn new(token: Option<&str>, role: Option<&str>, admin_role: &str) -> Self {
        Self {
            snapshot: SessionSnapshot {
                token: token.map(str::to_string),
                role: role.map(str::to_string),
            },
            admin_role: admin_role.to_string(),
        }
    }

    /// An authenticated administrator.
    #[cfg(test)]
    pub fn admin() -> Self {
        Self::new(Some("token"), Some("Admin"), "Admin")
    }

    /// No session at all.
    #[cfg(test)]
    pub fn anonymous() -> Self {
        Self::new(None, None, "Admin")
    }
}

impl SessionContext for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.snapshot.has_token()
    }

    fn is_admin(&self) -> bool {
        self.snapshot.has_role(&self.admin_role)
    }
}

impl TokenSource for StaticSession {
    fn token(&self) -> Option<String> {
        self.snapshot.bearer_token()
    }
}

type Loader = Box<dyn Fn() -> crate::api::error::Result<SessionSnapshot> + Send + Sync>;

/// Session read from the OS keyring.
///
/// Reads are cached for `refresh` so the guard can run on every render;
/// a session cleared from another terminal is noticed once the cache expires.
pub struct KeyringSession {
    admin_role: String,
    refresh: Duration,
    loader: Loader,
    cached: Mutex<Option<(Instant, SessionSnapshot)>>,
}

impl KeyringSession {
    pub fn new(admin_role: &str, refresh: Duration) -> Self {
        Self::with_loader(admin_role, refresh, || {
            Ok(SessionSnapshot {
                token: auth::get_token()?,
                role: auth::get_role()?,
            })
        })
    }

    fn with_loader(
        admin_role: &str,
        refresh: Duration,
        loader: impl Fn() -> crate::api::error::Result<SessionSnapshot> + Send + Sync + 'static,
    ) -> Self {
        Self {
            admin_role: admin_role.to_string(),
            refresh,
            loader: Box::new(loader),
            cached: Mutex::new(None),
        }
    }

    /// Drop the cached read so the next query hits the keyring.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let mut cached = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((read_at, snapshot)) = cached.as_ref() {
            if read_at.elapsed() < self.refresh {
                return snapshot.clone();
            }
        }

        let snapshot = (self.loader)().unwrap_or_else(|e| {
            warn!("Failed to read session from keyring: {}", e);
            SessionSnapshot::default()
        });
        debug!(
            has_token = snapshot.has_token(),
            role = ?snapshot.role,
            "Session refreshed"
        );
        *cached = Some((Instant::now(), snapshot.clone()));
        snapshot
    }
}

impl SessionContext for KeyringSession {
    fn is_authenticated(&self) -> bool {
        self.snapshot().has_token()
    }

    fn is_admin(&self) -> bool {
        self.snapshot().has_role(&self.admin_role)
    }

    fn refresh(&self) {
        self.invalidate();
    }
}

/// Requests share the guard's cached read, so a refresh is seen by both.
impl TokenSource for KeyringSession {
    fn token(&self) -> Option<String> {
        self.snapshot().bearer_token()
    }
}
