// Auth callback: the page the identity provider returns to, and its resolver endpoint
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::debug;
use url::Url;

use super::pages::generate_callback_page;
use super::state::AppState;
use crate::callback::{CallbackResolver, PageGuard};
use crate::models::{CallbackRequest, CallbackResponse};
use crate::navigation::RecordingNavigator;
use crate::utils::responses::{with_cookies, ResponseBuilder};

/// Serve the callback page
///
/// # Errors
/// Never fails
pub async fn callback_page(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header(("Cache-Control", "no-store"))
        .body(generate_callback_page(&state.settings)))
}

/// Resolve the URL the callback page was loaded at
///
/// Runs the callback resolver against this request's redirect path cookies
/// and answers with the navigation the page should perform. A confirmed
/// session comes back as the encrypted session cookie.
///
/// # Errors
/// Never fails; an unparsable URL is answered with 400
pub async fn callback(
    body: web::Json<CallbackRequest>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let callback_url = match Url::parse(&body.url) {
        Ok(url) => url,
        Err(e) => {
            debug!("Rejecting unparsable callback URL: {e}");
            return Ok(ResponseBuilder::bad_request()
                .with_error_code("invalid_callback_url")
                .with_message("The callback URL could not be parsed")
                .build());
        }
    };

    let store = state.redirect_store(&req);
    let sessions = state.session_cookie();
    let navigator = RecordingNavigator::new();
    let routes = &state.settings.routes;

    let outcome = CallbackResolver::new(
        state.identity.as_ref(),
        &store,
        &sessions,
        &navigator,
        routes,
    )
    .resolve(&callback_url, &PageGuard::new())
    .await;

    let decision = CallbackResponse::from_outcome(&outcome, navigator.last(), &routes.sign_in_path);

    let mut response = HttpResponse::Ok();
    response.insert_header(("Cache-Control", "no-store"));
    with_cookies(&mut response, store.storage().pending_cookies());
    with_cookies(&mut response, sessions.pending_cookie().into_iter().collect());
    Ok(response.json(decision))
}
