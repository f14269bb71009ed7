use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProviderError;

/// Authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Opaque authenticated identity returned on a successful callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Outcome of an authentication redirect, in classification order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Error(String),
    /// Password recovery; carries the session the recovery link signed in with
    Recovery(Option<AuthSession>),
    AuthenticatedSession(AuthSession),
    NoSession,
}

/// Shown when a failure carries no usable message
pub const DEFAULT_AUTH_ERROR_MESSAGE: &str = "An error occurred during authentication";

impl AuthResult {
    /// Classify a provider round-trip: failure, then recovery, then session presence
    #[must_use]
    pub fn classify(outcome: Result<Option<AuthSession>, ProviderError>, recovery: bool) -> Self {
        match outcome {
            Err(e) => Self::Error(
                e.user_message()
                    .unwrap_or_else(|| DEFAULT_AUTH_ERROR_MESSAGE.to_string()),
            ),
            Ok(session) if recovery => Self::Recovery(session),
            Ok(Some(session)) => Self::AuthenticatedSession(session),
            Ok(None) => Self::NoSession,
        }
    }
}
