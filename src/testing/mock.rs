//! Mock objects and fake implementations for testing
//!
//! Fakes for the external collaborators: the identity provider, the payment
//! provider and a storage backend that always fails.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

use super::fixtures::TestFixtures;
use crate::identity::{AuthSession, IdentityProvider, ProviderError};
use crate::payments::{CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentError};
use crate::storage::{SessionStorage, StorageError};

#[derive(Debug, Clone)]
enum SessionOutcome {
    Session(AuthSession),
    NoSession,
    Failure(ProviderError),
}

/// Identity provider with a fixed answer for every callback URL
#[derive(Debug)]
pub struct MockIdentityProvider {
    outcome: SessionOutcome,
    recovery_failure: Option<ProviderError>,
    recovery_requests: Mutex<Vec<(String, String)>>,
}

impl MockIdentityProvider {
    fn new(outcome: SessionOutcome) -> Self {
        Self {
            outcome,
            recovery_failure: None,
            recovery_requests: Mutex::new(Vec::new()),
        }
    }

    /// Every callback yields a valid session
    #[must_use]
    pub fn with_session() -> Self {
        Self::new(SessionOutcome::Session(TestFixtures::auth_session()))
    }

    /// Callbacks yield neither a session nor an error
    #[must_use]
    pub fn with_no_session() -> Self {
        Self::new(SessionOutcome::NoSession)
    }

    /// Every callback fails with `err`
    #[must_use]
    pub fn with_error(err: ProviderError) -> Self {
        Self::new(SessionOutcome::Failure(err))
    }

    /// Make recovery requests fail with `err`
    #[must_use]
    pub fn failing_recovery(mut self, err: ProviderError) -> Self {
        self.recovery_failure = Some(err);
        self
    }

    /// `(email, redirect_to)` of every recovery request received
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned
    #[must_use]
    pub fn recovery_requests(&self) -> Vec<(String, String)> {
        self.recovery_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn session_from_url(
        &self,
        _callback_url: &Url,
    ) -> Result<Option<AuthSession>, ProviderError> {
        match &self.outcome {
            SessionOutcome::Session(session) => Ok(Some(session.clone())),
            SessionOutcome::NoSession => Ok(None),
            SessionOutcome::Failure(err) => Err(err.clone()),
        }
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "https://identity.test/authorize?provider={provider}&redirect_to={}",
            urlencoding::encode(redirect_to)
        ))
    }

    async fn request_password_recovery(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ProviderError> {
        if let Ok(mut requests) = self.recovery_requests.lock() {
            requests.push((email.to_string(), redirect_to.to_string()));
        }
        match &self.recovery_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Storage backend where every operation fails, counting attempts
#[derive(Debug, Default)]
pub struct FailingSessionStorage {
    attempts: AtomicUsize,
}

impl FailingSessionStorage {
    /// Number of operations attempted so far
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> StorageError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        StorageError::Unavailable("storage disabled".to_string())
    }
}

impl SessionStorage for FailingSessionStorage {
    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(self.fail())
    }

    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(self.fail())
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(self.fail())
    }
}

#[derive(Debug, Clone, Copy)]
enum CheckoutBehaviour {
    Succeed,
    Unconfigured,
    ProviderDown,
}

/// Checkout provider that validates like the real one but never leaves the process
#[derive(Debug)]
pub struct MockCheckoutProvider {
    behaviour: CheckoutBehaviour,
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl MockCheckoutProvider {
    fn new(behaviour: CheckoutBehaviour) -> Self {
        Self {
            behaviour,
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn succeeding() -> Self {
        Self::new(CheckoutBehaviour::Succeed)
    }

    /// Behaves like a client without a secret key
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(CheckoutBehaviour::Unconfigured)
    }

    /// Provider rejects every valid request
    #[must_use]
    pub fn provider_down() -> Self {
        Self::new(CheckoutBehaviour::ProviderDown)
    }

    /// Valid requests that reached the provider
    ///
    /// # Panics
    ///
    /// Panics if the request log lock is poisoned
    #[must_use]
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        request.validate()?;

        match self.behaviour {
            CheckoutBehaviour::Unconfigured => Err(PaymentError::Configuration(
                "missing Stripe secret key".to_string(),
            )),
            CheckoutBehaviour::ProviderDown => {
                Err(PaymentError::Provider("Stripe returned 500".to_string()))
            }
            CheckoutBehaviour::Succeed => {
                let count = self.requests.lock().map_or(0, |mut requests| {
                    requests.push(request);
                    requests.len()
                });
                let id = format!("cs_test_{count}");
                Ok(CheckoutSession {
                    url: format!("https://checkout.stripe.com/c/pay/{id}"),
                    id,
                })
            }
        }
    }
}
