use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Prefix for cookies written by the session storage backend
pub const STORAGE_COOKIE_PREFIX: &str = "dd_ss_";

/// Cookie name backing a session storage key
#[must_use]
pub fn storage_cookie_name(key: &str) -> String {
    format!("{STORAGE_COOKIE_PREFIX}{key}")
}

/// Create a browser-session cookie
///
/// No `Max-Age`/`Expires` is set, so the browser discards it when the
/// session ends.
#[must_use]
pub fn create_session_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), value)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .finish()
}

/// Create a cookie the browser keeps for `max_age`
#[must_use]
pub fn create_persistent_cookie(
    name: &str,
    value: String,
    secure: bool,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build(name.to_owned(), value)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .finish()
}

/// Create an expired cookie to clear a specific cookie
#[must_use]
pub fn create_expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), "")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(-1))
        .finish()
}
