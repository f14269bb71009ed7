//! Stripe Checkout client
//!
//! Talks to the Stripe REST API directly with form-encoded requests and the
//! secret key as basic-auth username.

use async_trait::async_trait;
use log::{debug, error};
use serde::Deserialize;

use super::{CheckoutProvider, CheckoutRequest, CheckoutSession, PaymentError};
use crate::settings::PaymentSettings;

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

pub struct StripeCheckoutClient {
    api_base_url: String,
    secret_key: Option<String>,
    currency: String,
    success_url: String,
    cancel_url: String,
    http_client: reqwest::Client,
}

impl StripeCheckoutClient {
    #[must_use]
    pub fn from_settings(settings: &PaymentSettings) -> Self {
        Self {
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            secret_key: settings.get_secret_key(),
            currency: settings.currency.clone(),
            success_url: settings.success_url.clone(),
            cancel_url: settings.cancel_url.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Form body for `POST /v1/checkout/sessions`
    fn form_params(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (i, item) in request.items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(image) = item.image.as_deref().filter(|i| !i.is_empty()) {
                params.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    image.to_string(),
                ));
            }
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        params
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        request.validate()?;

        let secret_key = self
            .secret_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PaymentError::Configuration("missing Stripe secret key".to_string()))?;

        let url = format!("{}/v1/checkout/sessions", self.api_base_url);
        debug!(
            "Creating checkout session with {} line item(s)",
            request.items.len()
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(secret_key, Option::<&str>::None)
            .form(&self.form_params(&request))
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error.message)
                .unwrap_or_else(|| format!("Stripe returned {status}"));
            error!("Stripe checkout session creation failed: {message}");
            return Err(PaymentError::Provider(message));
        }

        let session: StripeCheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Provider(format!("failed to parse Stripe response: {e}")))?;

        let Some(url) = session.url.filter(|u| !u.is_empty()) else {
            error!("Stripe checkout session {} came back without a url", session.id);
            return Err(PaymentError::Provider(
                "checkout session has no url".to_string(),
            ));
        };

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
