use crate::storage::SessionStorage;
use crate::utils::logging::LoggingHelper;

/// Fixed storage key for the pending post-auth destination
pub const REDIRECT_PATH_KEY: &str = "redirectPath";

/// Best-effort store for the destination to restore after sign-in
///
/// Implementations never fail: a lost destination only means the user lands
/// on the default page.
pub trait RedirectStore {
    /// Remember `path`, replacing any previous value
    fn save(&self, path: &str);

    /// The remembered path, `None` if absent or unreadable
    fn get(&self) -> Option<String>;

    /// Forget the remembered path
    fn clear(&self);
}

/// [`RedirectStore`] over a [`SessionStorage`] backend
pub struct RedirectPathStore<S> {
    storage: S,
}

impl<S: SessionStorage> RedirectPathStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Access the backend, e.g. to collect pending cookies
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: SessionStorage> RedirectStore for RedirectPathStore<S> {
    fn save(&self, path: &str) {
        match self.storage.set_item(REDIRECT_PATH_KEY, path) {
            Ok(()) => LoggingHelper::log_redirect_saved(path),
            Err(e) => LoggingHelper::log_storage_failure("save", REDIRECT_PATH_KEY, &e),
        }
    }

    fn get(&self) -> Option<String> {
        self.storage
            .get_item(REDIRECT_PATH_KEY)
            .unwrap_or_else(|e| {
                LoggingHelper::log_storage_failure("get", REDIRECT_PATH_KEY, &e);
                None
            })
    }

    fn clear(&self) {
        if let Err(e) = self.storage.remove_item(REDIRECT_PATH_KEY) {
            LoggingHelper::log_storage_failure("clear", REDIRECT_PATH_KEY, &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;
    use crate::testing::mock::FailingSessionStorage;

    fn store() -> RedirectPathStore<MemorySessionStorage> {
        RedirectPathStore::new(MemorySessionStorage::new())
    }

    #[test]
    fn test_save_then_get_returns_path() {
        for path in ["/books", "/", "/episodes/7?t=120", "", "/über/ünïcode"] {
            let store = store();
            store.save(path);
            assert_eq!(store.get().as_deref(), Some(path));
        }
    }

    #[test]
    fn test_clear_then_get_is_absent() {
        let empty = store();
        empty.clear();
        assert_eq!(empty.get(), None);

        let filled = store();
        filled.save("/books");
        filled.clear();
        assert_eq!(filled.get(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let store = store();
        store.save("/books");
        store.save("/profile");
        assert_eq!(store.get().as_deref(), Some("/profile"));
    }

    #[test]
    fn test_uses_fixed_key() {
        let store = store();
        store.save("/books");
        assert_eq!(
            store.storage().get_item(REDIRECT_PATH_KEY).unwrap().as_deref(),
            Some("/books")
        );
    }

    #[test]
    fn test_failing_backend_degrades_silently() {
        let store = RedirectPathStore::new(FailingSessionStorage::default());

        store.save("/books");
        assert_eq!(store.get(), None);
        store.clear();
        assert_eq!(store.get(), None);
        assert_eq!(store.storage().attempts(), 4);
    }

    #[test]
    fn test_corrupted_value_reads_as_absent() {
        use crate::storage::CookieSessionStorage;
        use crate::utils::crypto::derive_encryption_key;
        use std::collections::HashMap;

        let mut incoming = HashMap::new();
        incoming.insert("dd_ss_redirectPath".to_string(), "garbage".to_string());
        let store = RedirectPathStore::new(CookieSessionStorage::with_cookies(
            incoming,
            derive_encryption_key(b"k"),
            false,
        ));

        assert_eq!(store.get(), None);
        store.save("/books");
        assert_eq!(store.get().as_deref(), Some("/books"));
    }
}
