#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use daring_different::{configure_services, settings::DaringSettings, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = DaringSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    start_server(settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(settings: DaringSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let cors_origins = settings.get_cors_origins();
    let routes = settings.routes.clone();
    let state = AppState::from_settings(settings);

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let routes = routes.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(|cfg| configure_services(cfg, &routes))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &DaringSettings) {
    let routes = &settings.routes;
    println!("Starting Daring Different backend on http://{bind_address}");
    println!();
    println!("Auth endpoints:");
    println!("  GET  {}  - Sign-in page / start provider sign-in", routes.sign_in_path);
    println!("  GET  {}  - Callback page", routes.callback_path);
    println!("  POST {}  - Resolve callback URL", routes.callback_path);
    println!("  POST /auth/recover  - Request password recovery link");
    println!();
    println!("Identity provider callback URL:");
    println!("  {}", settings.get_callback_url());
    println!();
    println!("Payment endpoints:");
    println!("  POST /api/create-checkout-session - Create Stripe checkout session");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping - Health check");
}
