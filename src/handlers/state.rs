use actix_web::HttpRequest;
use std::sync::Arc;

use crate::identity::{IdentityProvider, SupabaseIdentityClient};
use crate::payments::{CheckoutProvider, StripeCheckoutClient};
use crate::session::{AuthSessionCookie, RedirectPathStore};
use crate::settings::DaringSettings;
use crate::storage::CookieSessionStorage;
use crate::utils::crypto::{derive_encryption_key, ENCRYPTION_KEY_SIZE};
use crate::utils::logging::LoggingHelper;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<DaringSettings>,
    pub identity: Arc<dyn IdentityProvider>,
    pub checkout: Arc<dyn CheckoutProvider>,
    encryption_key: [u8; ENCRYPTION_KEY_SIZE],
}

impl AppState {
    #[must_use]
    pub fn new(
        settings: DaringSettings,
        identity: Arc<dyn IdentityProvider>,
        checkout: Arc<dyn CheckoutProvider>,
    ) -> Self {
        let encryption_key = derive_encryption_key(settings.session.session_secret.as_bytes());
        Self {
            settings: Arc::new(settings),
            identity,
            checkout,
            encryption_key,
        }
    }

    /// State backed by the real Supabase and Stripe clients
    #[must_use]
    pub fn from_settings(settings: DaringSettings) -> Self {
        let identity = SupabaseIdentityClient::from_settings(&settings.identity);
        LoggingHelper::log_identity_provider_init(
            &settings.identity.url,
            &settings.identity.providers,
            identity.is_configured(),
        );

        let checkout = StripeCheckoutClient::from_settings(&settings.payments);
        LoggingHelper::log_payment_provider_init(checkout.is_configured());

        Self::new(settings, Arc::new(identity), Arc::new(checkout))
    }

    /// Redirect path store over this request's storage cookies
    #[must_use]
    pub fn redirect_store(&self, req: &HttpRequest) -> RedirectPathStore<CookieSessionStorage> {
        RedirectPathStore::new(CookieSessionStorage::from_request(
            req,
            self.encryption_key,
            self.settings.cookies.secure,
        ))
    }

    /// Sink sealing a confirmed session into the session cookie
    #[must_use]
    pub fn session_cookie(&self) -> AuthSessionCookie {
        AuthSessionCookie::new(self.encryption_key, self.settings.cookies.secure)
    }
}
