//! Session context - the signed-in user's credentials and tenant.
//!
//! The session is acquired once at start-up (from `SESSION_TOKEN`, `TENANT_ID`,
//! `TENANT_NAME` and `USER_NAME`) and handed to every API client and form by
//! reference. Logging out invalidates it; any call made afterwards fails with
//! [`Error::SessionInvalidated`] instead of going out with a stale token.

use crate::errors::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Values read at login. Immutable for the life of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    /// Bearer token sent as `Authorization`
    pub token: String,
    /// Tenant the user is acting for
    pub tenant_id: String,
    /// Display name of the tenant
    pub tenant_name: String,
    /// Display name of the user
    pub user_name: String,
}

/// A live session. Share it as `Arc<Session>`.
#[derive(Debug)]
pub struct Session {
    data: SessionData,
    active: AtomicBool,
}

impl Session {
    /// Starts a session from already-known credentials.
    #[must_use]
    pub const fn new(data: SessionData) -> Self {
        Self {
            data,
            active: AtomicBool::new(true),
        }
    }

    /// Starts a session from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Starts a session from any key lookup. `SESSION_TOKEN` and `TENANT_ID`
    /// are required; the display names fall back to empty strings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config {
                    message: format!("{key} is not set; sign in first"),
                })
        };

        let data = SessionData {
            token: required("SESSION_TOKEN")?,
            tenant_id: required("TENANT_ID")?,
            tenant_name: lookup("TENANT_NAME").unwrap_or_default(),
            user_name: lookup("USER_NAME").unwrap_or_default(),
        };
        tracing::debug!(
            "Session acquired for user '{}' in tenant '{}'",
            data.user_name,
            data.tenant_id
        );
        Ok(Self::new(data))
    }

    /// Returns the session values, or fails if the session was logged out.
    pub fn credentials(&self) -> Result<&SessionData> {
        if self.active.load(Ordering::Acquire) {
            Ok(&self.data)
        } else {
            Err(Error::SessionInvalidated)
        }
    }

    /// `Authorization` header value for the current session.
    pub fn authorization(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.credentials()?.token))
    }

    /// Whether the session can still be used.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Ends the session. Idempotent.
    pub fn logout(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::info!("Session for user '{}' logged out", self.data.user_name);
        }
    }
}
