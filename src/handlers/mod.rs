// HTTP request handlers
pub mod auth;
pub mod callback;
pub mod checkout;
pub mod pages;
pub mod state;

use actix_web::web;

pub use auth::{recover, sign_in};
pub use callback::{callback, callback_page};
pub use checkout::create_checkout_session;
pub use pages::health;
pub use state::AppState;

use crate::settings::RouteSettings;

/// Register every route; auth routes follow the configured paths
pub fn configure_services(cfg: &mut web::ServiceConfig, routes: &RouteSettings) {
    cfg.route(&routes.sign_in_path, web::get().to(sign_in))
        .route(&routes.callback_path, web::get().to(callback_page))
        .route(&routes.callback_path, web::post().to(callback))
        .route("/auth/recover", web::post().to(recover))
        .route(
            "/api/create-checkout-session",
            web::post().to(create_checkout_session),
        )
        .route("/ping", web::get().to(health));
}
