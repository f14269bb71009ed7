// Sign-in entry point and password recovery
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::pages::generate_sign_in_page;
use super::state::AppState;
use crate::identity::ProviderError;
use crate::models::{RecoverRequest, RecoverResponse};
use crate::session::RedirectStore;
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect_validator::validate_post_auth_redirect;
use crate::utils::responses::{with_cookies, ResponseBuilder};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

#[derive(Deserialize)]
pub struct SignInQuery {
    pub provider: Option<String>,
    pub rd: Option<String>,
    pub error: Option<String>,
}

/// Sign-in entry point
///
/// Remembers `rd` for after sign-in, then either starts the external
/// provider flow or renders the sign-in page.
///
/// # Errors
/// Never fails; invalid input is answered with an error response
pub async fn sign_in(
    query: web::Query<SignInQuery>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let store = state.redirect_store(&req);

    if let Some(rd) = query.rd.as_deref().filter(|rd| !rd.is_empty()) {
        match validate_post_auth_redirect(rd) {
            Ok(path) => store.save(&path),
            Err(response) => return Ok(response),
        }
    }

    let settings = &state.settings;
    match query.provider.as_deref() {
        Some(provider) if settings.identity.is_provider_enabled(provider) => {
            match state
                .identity
                .authorize_url(provider, &settings.get_callback_url())
            {
                Ok(authorize_url) => {
                    info!("Starting {provider} sign-in");
                    Ok(ResponseBuilder::redirect_with_cookies(
                        &authorize_url,
                        store.storage().pending_cookies(),
                    ))
                }
                Err(e) => {
                    LoggingHelper::log_provider_failure(&e);
                    Ok(ResponseBuilder::service_unavailable()
                        .with_error_code("provider_unavailable")
                        .with_message(&e.to_string())
                        .build())
                }
            }
        }
        Some(provider) => {
            debug!("Sign-in requested for disabled provider {provider}");
            Ok(ResponseBuilder::bad_request()
                .with_error_code("invalid_provider")
                .with_message(&format!("Provider '{provider}' is not enabled"))
                .build())
        }
        None => {
            let mut response = HttpResponse::Ok();
            response.content_type("text/html; charset=utf-8");
            with_cookies(&mut response, store.storage().pending_cookies());
            Ok(response.body(generate_sign_in_page(settings, query.error.as_deref())))
        }
    }
}

/// Ask the identity provider to email a password recovery link
///
/// The link returns to the callback page, which routes the user to the
/// password update page.
///
/// # Errors
/// Never fails; invalid input and provider failures become error responses
pub async fn recover(
    body: web::Json<RecoverRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let email = body.email.trim();
    if !EMAIL_PATTERN.is_match(email) {
        return Ok(ResponseBuilder::bad_request()
            .with_error_code("invalid_email")
            .with_message("A valid email address is required")
            .build());
    }

    match state
        .identity
        .request_password_recovery(email, &state.settings.get_callback_url())
        .await
    {
        Ok(()) => {
            info!("Password recovery link requested");
            Ok(HttpResponse::Accepted().json(RecoverResponse {
                status: "accepted".to_string(),
                message: "If an account exists for this email, a recovery link is on its way"
                    .to_string(),
            }))
        }
        Err(e @ ProviderError::Configuration(_)) => {
            error!("Password recovery unavailable: {e}");
            Ok(ResponseBuilder::service_unavailable()
                .with_error_code("provider_unavailable")
                .with_message(&e.to_string())
                .build())
        }
        Err(e) => {
            LoggingHelper::log_provider_failure(&e);
            Ok(ResponseBuilder::bad_gateway()
                .with_error_code("recovery_failed")
                .with_message(
                    &e.user_message()
                        .unwrap_or_else(|| "Password recovery request failed".to_string()),
                )
                .build())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EMAIL_PATTERN;

    #[test]
    fn test_email_pattern() {
        for valid in ["reader@daringdifferent.com", "a.b+c@d.co"] {
            assert!(EMAIL_PATTERN.is_match(valid), "{valid}");
        }
        for invalid in ["", "reader", "reader@", "@daringdifferent.com", "a b@c.d", "a@b"] {
            assert!(!EMAIL_PATTERN.is_match(invalid), "{invalid}");
        }
    }
}
