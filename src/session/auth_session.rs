// Signed-in session handed to the browser after a successful callback
use actix_web::cookie::{time::Duration, Cookie};
use anyhow::Result;
use chrono::Utc;
use std::sync::{Mutex, PoisonError};

use crate::identity::AuthSession;
use crate::utils::cookie_utils::create_persistent_cookie;
use crate::utils::crypto::{decrypt_data, encrypt_data, ENCRYPTION_KEY_SIZE};
use crate::utils::logging::LoggingHelper;

/// Cookie holding the encrypted [`AuthSession`]
pub const AUTH_SESSION_COOKIE: &str = "dd_session";

/// Destination for a session the callback confirmed
pub trait SessionSink: Send + Sync {
    /// Keep `session` for the browser. Never fails; problems are logged.
    fn persist(&self, session: &AuthSession);
}

/// Request-scoped sink that seals the session into [`AUTH_SESSION_COOKIE`]
///
/// The cookie lives until the session's `expires_at`.
pub struct AuthSessionCookie {
    encryption_key: [u8; ENCRYPTION_KEY_SIZE],
    cookie_secure: bool,
    pending: Mutex<Option<Cookie<'static>>>,
}

impl AuthSessionCookie {
    #[must_use]
    pub fn new(encryption_key: [u8; ENCRYPTION_KEY_SIZE], cookie_secure: bool) -> Self {
        Self {
            encryption_key,
            cookie_secure,
            pending: Mutex::new(None),
        }
    }

    /// Create the encrypted session cookie
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_cookie(&self, session: &AuthSession) -> Result<Cookie<'static>> {
        let value = encrypt_data(session, &self.encryption_key)?;
        let remaining = (session.expires_at - Utc::now()).num_seconds().max(0);

        Ok(create_persistent_cookie(
            AUTH_SESSION_COOKIE,
            value,
            self.cookie_secure,
            Duration::seconds(remaining),
        ))
    }

    /// Decrypt a cookie value produced by [`Self::create_cookie`]
    ///
    /// # Errors
    ///
    /// Returns an error if the value was tampered with or sealed under another key
    pub fn read(&self, value: &str) -> Result<AuthSession> {
        decrypt_data(value, &self.encryption_key)
    }

    /// Cookie to attach to the response, if a session was persisted
    #[must_use]
    pub fn pending_cookie(&self) -> Option<Cookie<'static>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionSink for AuthSessionCookie {
    fn persist(&self, session: &AuthSession) {
        match self.create_cookie(session) {
            Ok(cookie) => {
                LoggingHelper::log_session_persisted(session);
                *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie);
            }
            Err(e) => LoggingHelper::log_session_persist_failure(&e),
        }
    }
}
