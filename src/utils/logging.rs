// Centralized logging for the sign-in and callback flow
use log::{debug, error, info, warn};

use crate::callback::CallbackState;
use crate::identity::{AuthSession, ProviderError};
use crate::storage::StorageError;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a swallowed storage failure
    pub fn log_storage_failure(operation: &str, key: &str, err: &StorageError) {
        warn!("Session storage {operation} failed for '{key}', continuing without it: {err}");
    }

    /// Log a failed provider round-trip
    pub fn log_provider_failure(err: &ProviderError) {
        if err.is_reported() {
            warn!("Identity provider reported an authentication failure: {err}");
        } else {
            error!("Identity provider round-trip failed: {err}");
        }
    }

    /// Log the state the callback resolver settled on
    pub fn log_callback_outcome(state: &CallbackState) {
        match state {
            CallbackState::Error { message } => {
                info!("Auth callback ended in error state: {message}");
            }
            CallbackState::RecoveryRedirect => {
                info!("Auth callback is a password recovery, sending user to password update");
            }
            CallbackState::RestoreRedirect { path } => {
                info!("Auth callback restoring saved destination {path}");
            }
            CallbackState::DefaultRedirect => {
                info!("Auth callback signed in with no saved destination");
            }
            CallbackState::SignInRedirect { from } => {
                info!("Auth callback returned no session, back to sign-in (from: {from:?})");
            }
        }
    }

    /// Log that a page was torn down before its side effects ran
    pub fn log_page_torn_down(state: &CallbackState) {
        debug!("Callback page torn down, discarding side effects of {state:?}");
    }

    /// Log a confirmed session being handed to the browser
    pub fn log_session_persisted(session: &AuthSession) {
        debug!(
            "Persisting session for user {} until {}",
            session.user.id, session.expires_at
        );
    }

    /// Log a session that could not be sealed into its cookie
    pub fn log_session_persist_failure(err: &anyhow::Error) {
        error!("Failed to persist authenticated session: {err}");
    }

    /// Log a redirect path being remembered for after sign-in
    pub fn log_redirect_saved(path: &str) {
        debug!("Remembering post-auth destination {path}");
    }

    /// Log provider initialization status
    pub fn log_identity_provider_init(url: &str, providers: &[String], configured: bool) {
        if configured {
            info!("✅ Identity provider configured at {url} with providers {providers:?}");
        } else {
            info!("❌ Identity provider at {url} not configured - missing anon key");
        }
    }

    /// Log payment provider initialization status
    pub fn log_payment_provider_init(configured: bool) {
        if configured {
            info!("✅ Stripe checkout configured");
        } else {
            info!("❌ Stripe checkout not configured - missing secret key");
        }
    }
}
