//! One-off payment checkout
//!
//! The site sells individual items (books, courses); a checkout session is
//! created with the payment provider and the browser is sent to its hosted
//! page.

pub mod stripe;

pub use stripe::StripeCheckoutClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single purchasable line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    /// Price per unit in the currency's minor unit (cents)
    #[serde(default)]
    pub unit_amount: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

/// Server-side price for an item sold on the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub unit_amount: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl CheckoutRequest {
    /// Price every item from `catalog`, ignoring what the browser sent
    ///
    /// An empty catalog leaves the request untouched.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidRequest` for an item the catalog does not list
    pub fn priced_from(mut self, catalog: &[CatalogEntry]) -> Result<Self, PaymentError> {
        if catalog.is_empty() {
            return Ok(self);
        }

        for item in &mut self.items {
            let entry = catalog
                .iter()
                .find(|entry| entry.name == item.name)
                .ok_or_else(|| {
                    PaymentError::InvalidRequest(format!("unknown item '{}'", item.name))
                })?;
            item.unit_amount = entry.unit_amount;
            item.image.clone_from(&entry.image);
        }

        Ok(self)
    }

    /// Reject requests the provider would refuse anyway
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidRequest` describing the first bad item
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.items.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "at least one item is required".to_string(),
            ));
        }

        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(PaymentError::InvalidRequest(format!(
                    "item {index} has no name"
                )));
            }
            if item.unit_amount <= 0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "item {index} must have a positive unit_amount"
                )));
            }
            if item.quantity == 0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "item {index} must have a quantity of at least 1"
                )));
            }
        }

        Ok(())
    }
}

/// Hosted checkout session created by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid checkout request: {0}")]
    InvalidRequest(String),
    #[error("payments are not configured: {0}")]
    Configuration(String),
    #[error("payment provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a hosted checkout session for `request`
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the client is not
    /// configured, or the provider rejects the request
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}
