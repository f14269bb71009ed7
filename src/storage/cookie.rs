use actix_web::{cookie::Cookie, HttpRequest};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{SessionStorage, StorageError};
use crate::utils::cookie_utils::{
    create_expired_cookie, create_session_cookie, storage_cookie_name, STORAGE_COOKIE_PREFIX,
};
use crate::utils::crypto::{decrypt_data, encrypt_data, ENCRYPTION_KEY_SIZE};

#[derive(Debug, Clone)]
enum PendingChange {
    Set { value: String, sealed: String },
    Remove,
}

/// Request-scoped session storage kept in encrypted browser-session cookies
///
/// Reads come from pending changes first, then the request's cookies. Writes
/// are buffered and turned into `Set-Cookie` headers by [`Self::pending_cookies`].
pub struct CookieSessionStorage {
    encryption_key: [u8; ENCRYPTION_KEY_SIZE],
    cookie_secure: bool,
    incoming: HashMap<String, String>,
    pending: Mutex<HashMap<String, PendingChange>>,
}

impl CookieSessionStorage {
    /// Create storage seeded with the storage cookies of `req`
    #[must_use]
    pub fn from_request(
        req: &HttpRequest,
        encryption_key: [u8; ENCRYPTION_KEY_SIZE],
        cookie_secure: bool,
    ) -> Self {
        let incoming = match req.cookies() {
            Ok(cookies) => cookies
                .iter()
                .filter(|c| c.name().starts_with(STORAGE_COOKIE_PREFIX))
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect(),
            Err(e) => {
                debug!("Failed to parse request cookies: {e}");
                HashMap::new()
            }
        };

        Self::with_cookies(incoming, encryption_key, cookie_secure)
    }

    /// Create storage from already extracted cookie name/value pairs
    #[must_use]
    pub fn with_cookies(
        incoming: HashMap<String, String>,
        encryption_key: [u8; ENCRYPTION_KEY_SIZE],
        cookie_secure: bool,
    ) -> Self {
        Self {
            encryption_key,
            cookie_secure,
            incoming,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Cookies to attach to the response so the browser reflects every write
    #[must_use]
    pub fn pending_cookies(&self) -> Vec<Cookie<'static>> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cookies: Vec<Cookie<'static>> = pending
            .iter()
            .map(|(key, change)| {
                let name = storage_cookie_name(key);
                match change {
                    PendingChange::Set { sealed, .. } => {
                        create_session_cookie(&name, sealed.clone(), self.cookie_secure)
                    }
                    PendingChange::Remove => create_expired_cookie(&name, self.cookie_secure),
                }
            })
            .collect();
        cookies.sort_by(|a, b| a.name().cmp(b.name()));
        cookies
    }

    fn lock_pending(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, PendingChange>>, StorageError> {
        self.pending
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("storage lock poisoned: {e}")))
    }
}

impl SessionStorage for CookieSessionStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let sealed =
            encrypt_data(&value, &self.encryption_key).map_err(|e| StorageError::Encoding {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        self.lock_pending()?.insert(
            key.to_string(),
            PendingChange::Set {
                value: value.to_string(),
                sealed,
            },
        );
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(change) = self.lock_pending()?.get(key) {
            return Ok(match change {
                PendingChange::Set { value, .. } => Some(value.clone()),
                PendingChange::Remove => None,
            });
        }

        let Some(sealed) = self.incoming.get(&storage_cookie_name(key)) else {
            return Ok(None);
        };
        if sealed.is_empty() {
            return Ok(None);
        }

        decrypt_data::<String>(sealed, &self.encryption_key)
            .map(Some)
            .map_err(|e| StorageError::Corrupted {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock_pending()?
            .insert(key.to_string(), PendingChange::Remove);
        Ok(())
    }
}
