// Checkout session creation
use actix_web::{web, HttpResponse, Result};
use log::{info, warn};

use super::state::AppState;
use crate::payments::{CheckoutRequest, PaymentError};
use crate::utils::responses::ResponseBuilder;

/// Create a hosted checkout session and return its id and URL
///
/// Items are priced from the configured catalog when there is one.
///
/// # Errors
/// Never fails; payment errors are mapped to 400, 502 or 503
pub async fn create_checkout_session(
    body: web::Json<CheckoutRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let priced = body
        .into_inner()
        .priced_from(&state.settings.payments.catalog);
    let outcome = match priced {
        Ok(request) => state.checkout.create_checkout_session(request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(session) => {
            info!("Created checkout session {}", session.id);
            Ok(HttpResponse::Ok().json(session))
        }
        Err(e @ PaymentError::InvalidRequest(_)) => {
            warn!("Rejected checkout request: {e}");
            Ok(ResponseBuilder::bad_request()
                .with_error_code("invalid_request")
                .with_message(&e.to_string())
                .build())
        }
        Err(e @ PaymentError::Configuration(_)) => {
            warn!("Checkout unavailable: {e}");
            Ok(ResponseBuilder::service_unavailable()
                .with_error_code("payments_unavailable")
                .with_message(&e.to_string())
                .build())
        }
        Err(e @ PaymentError::Provider(_)) => {
            warn!("Checkout provider failure: {e}");
            Ok(ResponseBuilder::bad_gateway()
                .with_error_code("checkout_failed")
                .with_message(&e.to_string())
                .build())
        }
    }
}
