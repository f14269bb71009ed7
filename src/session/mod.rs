// Browser-session state kept across the sign-in round-trip
pub mod auth_session;
pub mod redirect_path;

pub use auth_session::{AuthSessionCookie, SessionSink, AUTH_SESSION_COOKIE};
pub use redirect_path::{RedirectPathStore, RedirectStore, REDIRECT_PATH_KEY};
