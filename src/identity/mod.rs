//! Identity provider integration
//!
//! The provider is an opaque collaborator: it turns a callback URL into a
//! session (or a failure), builds authorize URLs for the sign-in entry point,
//! and sends password recovery links.

pub mod supabase;
pub mod types;

pub use supabase::SupabaseIdentityClient;
pub use types::{AuthResult, AuthSession, AuthUser, DEFAULT_AUTH_ERROR_MESSAGE};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Identity provider failures
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider explicitly reported an error
    #[error("{0}")]
    Reported(String),
    /// The round-trip itself failed (network, bad status, bad payload)
    #[error("{0}")]
    Transport(String),
    /// Client is missing required configuration
    #[error("identity provider is not configured: {0}")]
    Configuration(String),
    /// Failure without any message
    #[error("unexpected identity provider failure")]
    Unexpected,
}

impl ProviderError {
    /// Whether the provider itself reported this failure
    #[must_use]
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }

    /// Text to show the user, `None` when the failure has no usable message
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Reported(msg) | Self::Transport(msg) => {
                let trimmed = msg.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Configuration(_) => Some(self.to_string()),
            Self::Unexpected => None,
        }
    }
}

/// Identity provider client
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the session carried by a callback URL
    ///
    /// `Ok(None)` means the provider returned neither a session nor an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider reports a failure or cannot be reached
    async fn session_from_url(&self, callback_url: &Url)
        -> Result<Option<AuthSession>, ProviderError>;

    /// URL that starts sign-in with an external `provider`
    ///
    /// # Errors
    ///
    /// Returns an error if the client is misconfigured
    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, ProviderError>;

    /// Ask the provider to email a recovery link that returns to `redirect_to`
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the request or cannot be reached
    async fn request_password_recovery(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError>;
}

/// Whether a callback URL belongs to a password-recovery flow
///
/// The provider marks recovery redirects with `type=recovery` in the fragment.
#[must_use]
pub fn is_recovery_flow(callback_url: &Url) -> bool {
    callback_url.fragment().is_some_and(|fragment| {
        url::form_urlencoded::parse(fragment.as_bytes())
            .any(|(key, value)| key == "type" && value == "recovery")
    })
}
