//! Test fixtures providing pre-built test objects

use chrono::{Duration, Utc};
use std::sync::Arc;

use super::constants::{
    TEST_BASE_URL, TEST_EMAIL, TEST_IDENTITY_URL, TEST_SESSION_SECRET, TEST_USER_ID,
};
use crate::handlers::AppState;
use crate::identity::{AuthSession, AuthUser, IdentityProvider};
use crate::payments::CheckoutProvider;
use crate::settings::DaringSettings;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// A valid session as the identity provider would return it
    #[must_use]
    pub fn auth_session() -> AuthSession {
        AuthSession {
            access_token: "test_access_token".to_string(),
            refresh_token: Some("test_refresh_token".to_string()),
            token_type: "bearer".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: TEST_USER_ID.to_string(),
                email: Some(TEST_EMAIL.to_string()),
            },
        }
    }

    /// Settings with a fixed secret, insecure cookies and no env lookups
    #[must_use]
    pub fn settings() -> DaringSettings {
        let mut settings = DaringSettings::default();
        settings.application.redirect_base_url = TEST_BASE_URL.to_string();
        settings.session.session_secret = TEST_SESSION_SECRET.to_string();
        settings.cookies.secure = false;
        settings.identity.url = TEST_IDENTITY_URL.to_string();
        settings.identity.anon_key = Some("test-anon-key".to_string());
        settings.identity.anon_key_env = None;
        settings.payments.secret_key_env = None;
        settings
    }

    /// Application state over the given fake providers
    #[must_use]
    pub fn app_state(
        identity: impl IdentityProvider + 'static,
        checkout: impl CheckoutProvider + 'static,
    ) -> AppState {
        AppState::new(Self::settings(), Arc::new(identity), Arc::new(checkout))
    }
}
