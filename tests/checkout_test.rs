// Checkout session endpoint against a fake payment provider
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use daring_different::payments::CatalogEntry;
use daring_different::testing::mock::{MockCheckoutProvider, MockIdentityProvider};
use daring_different::testing::TestFixtures;
use daring_different::{configure_services, AppState};

macro_rules! init_app {
    ($state:expr) => {{
        let state: AppState = $state;
        let routes = state.settings.routes.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(move |cfg| configure_services(cfg, &routes)),
        )
        .await
    }};
}

fn book_order() -> Value {
    json!({
        "items": [
            {
                "name": "Daring Different (hardcover)",
                "unit_amount": 2999,
                "quantity": 1,
                "image": "https://daringdifferent.com/cover.jpg"
            },
            { "name": "Companion workbook", "unit_amount": 999, "quantity": 2 }
        ]
    })
}

#[actix_web::test]
async fn test_checkout_session_created() {
    let checkout = Arc::new(MockCheckoutProvider::succeeding());
    let app = init_app!(AppState::new(
        TestFixtures::settings(),
        Arc::new(MockIdentityProvider::with_session()),
        checkout.clone(),
    ));

    let req = test::TestRequest::post()
        .uri("/api/create-checkout-session")
        .set_json(book_order())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test_1");

    let requests = checkout.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].items[1].quantity, 2);
    assert_eq!(requests[0].items[1].image, None);
}

#[actix_web::test]
async fn test_invalid_order_rejected() {
    let app = init_app!(TestFixtures::app_state(
        MockIdentityProvider::with_session(),
        MockCheckoutProvider::succeeding(),
    ));

    for order in [
        json!({ "items": [] }),
        json!({ "items": [{ "name": "", "unit_amount": 100, "quantity": 1 }] }),
        json!({ "items": [{ "name": "Mug", "unit_amount": 0, "quantity": 1 }] }),
        json!({ "items": [{ "name": "Mug", "unit_amount": 100, "quantity": 0 }] }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/create-checkout-session")
            .set_json(&order)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{order}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_request");
    }
}

#[actix_web::test]
async fn test_unconfigured_payments_unavailable() {
    let app = init_app!(TestFixtures::app_state(
        MockIdentityProvider::with_session(),
        MockCheckoutProvider::unconfigured(),
    ));

    let req = test::TestRequest::post()
        .uri("/api/create-checkout-session")
        .set_json(book_order())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_provider_failure_is_bad_gateway() {
    let app = init_app!(TestFixtures::app_state(
        MockIdentityProvider::with_session(),
        MockCheckoutProvider::provider_down(),
    ));

    let req = test::TestRequest::post()
        .uri("/api/create-checkout-session")
        .set_json(book_order())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "checkout_failed");
}

fn catalog_state(checkout: Arc<MockCheckoutProvider>) -> AppState {
    let mut settings = TestFixtures::settings();
    settings.payments.catalog = vec![CatalogEntry {
        name: "Daring Different (hardcover)".to_string(),
        unit_amount: 2999,
        image: None,
    }];
    AppState::new(
        settings,
        Arc::new(MockIdentityProvider::with_session()),
        checkout,
    )
}

#[actix_web::test]
async fn test_catalog_price_wins_over_client_price() {
    let checkout = Arc::new(MockCheckoutProvider::succeeding());
    let app = init_app!(catalog_state(checkout.clone()));

    let req = test::TestRequest::post()
        .uri("/api/create-checkout-session")
        .set_json(json!({
            "items": [{ "name": "Daring Different (hardcover)", "unit_amount": 1, "quantity": 2 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = checkout.requests();
    assert_eq!(requests[0].items[0].unit_amount, 2999);
    assert_eq!(requests[0].items[0].quantity, 2);
}

#[actix_web::test]
async fn test_catalog_rejects_unlisted_item() {
    let checkout = Arc::new(MockCheckoutProvider::succeeding());
    let app = init_app!(catalog_state(checkout.clone()));

    let req = test::TestRequest::post()
        .uri("/api/create-checkout-session")
        .set_json(json!({ "items": [{ "name": "Gift card", "quantity": 1 }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(checkout.requests().is_empty());
}
