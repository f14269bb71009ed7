//! Post-authentication callback resolution
//!
//! Runs once per load of the callback page: asks the identity provider what
//! the redirect carried, classifies the outcome, then persists any confirmed
//! session, updates the redirect path store and navigates accordingly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

use crate::identity::{is_recovery_flow, AuthResult, IdentityProvider};
use crate::navigation::{NavigateOptions, NavigationState, Navigator};
use crate::session::{RedirectStore, SessionSink};
use crate::settings::RouteSettings;
use crate::utils::logging::LoggingHelper;

/// Terminal state of one resolver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    /// Provider failure; the page shows `message` and offers a way back to sign-in
    Error { message: String },
    RecoveryRedirect,
    RestoreRedirect { path: String },
    DefaultRedirect,
    /// No session; `from` is the destination forwarded to the sign-in page
    SignInRedirect { from: Option<String> },
}

/// Liveness of the page that owns a resolver run
///
/// Clones share the flag, so the owner can tear the page down while the
/// resolver is suspended on the provider round-trip.
#[derive(Debug, Clone)]
pub struct PageGuard {
    active: Arc<AtomicBool>,
}

impl PageGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn tear_down(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for PageGuard {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CallbackResolver<'a> {
    provider: &'a dyn IdentityProvider,
    store: &'a dyn RedirectStore,
    sessions: &'a dyn SessionSink,
    navigator: &'a dyn Navigator,
    routes: &'a RouteSettings,
}

impl<'a> CallbackResolver<'a> {
    #[must_use]
    pub fn new(
        provider: &'a dyn IdentityProvider,
        store: &'a dyn RedirectStore,
        sessions: &'a dyn SessionSink,
        navigator: &'a dyn Navigator,
        routes: &'a RouteSettings,
    ) -> Self {
        Self {
            provider,
            store,
            sessions,
            navigator,
            routes,
        }
    }

    /// Resolve the callback at `callback_url`
    ///
    /// Never fails: storage problems are logged and degrade to "no stored
    /// path", provider problems end in [`CallbackState::Error`]. If `guard`
    /// is torn down by the time the provider answers, the state is still
    /// classified and returned but no session, store write or navigation
    /// happens.
    pub async fn resolve(&self, callback_url: &Url, guard: &PageGuard) -> CallbackState {
        let outcome = self.provider.session_from_url(callback_url).await;
        if let Err(e) = &outcome {
            LoggingHelper::log_provider_failure(e);
        }

        let (state, session) = match AuthResult::classify(outcome, is_recovery_flow(callback_url))
        {
            AuthResult::Error(message) => (CallbackState::Error { message }, None),
            AuthResult::Recovery(session) => (CallbackState::RecoveryRedirect, session),
            AuthResult::AuthenticatedSession(session) => {
                let state = match self.store.get() {
                    Some(path) => CallbackState::RestoreRedirect { path },
                    None => CallbackState::DefaultRedirect,
                };
                (state, Some(session))
            }
            AuthResult::NoSession => (
                CallbackState::SignInRedirect {
                    from: self.store.get(),
                },
                None,
            ),
        };

        if guard.is_active() {
            if let Some(session) = &session {
                self.sessions.persist(session);
            }
            self.apply(&state);
            LoggingHelper::log_callback_outcome(&state);
        } else {
            LoggingHelper::log_page_torn_down(&state);
        }

        state
    }

    /// The manual "back to sign-in" action offered from the error state
    pub fn retry_sign_in(&self, guard: &PageGuard) {
        if guard.is_active() {
            self.navigator
                .navigate(&self.routes.sign_in_path, NavigateOptions::default());
        }
    }

    fn apply(&self, state: &CallbackState) {
        match state {
            CallbackState::Error { .. } => {}
            CallbackState::RecoveryRedirect => {
                self.navigator.navigate(
                    &self.routes.password_update_path,
                    NavigateOptions::default(),
                );
            }
            CallbackState::RestoreRedirect { path } => {
                self.store.clear();
                self.navigator.navigate(
                    path,
                    NavigateOptions {
                        replace: true,
                        state: Some(NavigationState::from_auth()),
                    },
                );
            }
            CallbackState::DefaultRedirect => {
                self.navigator
                    .navigate(&self.routes.home_path, NavigateOptions::default());
            }
            CallbackState::SignInRedirect { from } => {
                self.navigator.navigate(
                    &self.routes.sign_in_path,
                    NavigateOptions {
                        replace: false,
                        state: from.as_deref().map(NavigationState::return_to),
                    },
                );
            }
        }
    }
}
