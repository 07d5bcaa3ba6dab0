//! The full storefront flow against a real (temporary) SQLite database. Only the payment provider
//! itself is stubbed out.
use actix_web::{test, test::TestRequest, web, App};
use anyhow::Result;
use course_payment_engine::{LedgerApi, SqliteDatabase, UserApi};
use cpg_common::PaymentProvider;
use log::*;
use payment_providers::{CaptureOutcome, CheckoutSession};
use serde_json::{json, Value};

use super::{helpers, mocks::MockGateway};
use crate::{
    auth::{TokenIssuer, TokenVerifier},
    config::CourseCatalog,
    data_objects::AuthResponse,
    middleware::BearerAuth,
    routes::{
        MyPurchasesRoute,
        PaypalCaptureRoute,
        PaypalCreateOrderRoute,
        ProfileRoute,
        RegisterRoute,
    },
    server::json_error_handler,
};

const APPROVE_LINK: &str = "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T";
const ORDER_ID: &str = "5O190127TN364715T";

fn stub_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_provider().return_const(PaymentProvider::PayPal);
    gateway.expect_create_checkout().returning(|_, _, _| {
        Ok(CheckoutSession {
            provider: PaymentProvider::PayPal,
            session_id: ORDER_ID.to_string(),
            redirect_url: Some(APPROVE_LINK.to_string()),
            raw: json!({
                "id": ORDER_ID,
                "status": "CREATED",
                "links": [{ "href": APPROVE_LINK, "rel": "approve", "method": "GET" }]
            }),
        })
    });
    gateway.expect_capture_checkout().returning(|_, order_id| {
        Ok(CaptureOutcome {
            provider: PaymentProvider::PayPal,
            transaction_id: order_id.to_string(),
            status: "COMPLETED".to_string(),
            raw: json!({ "id": order_id, "status": "COMPLETED" }),
        })
    });
    gateway
}

#[actix_web::test]
async fn register_buy_and_list_purchases() -> Result<()> {
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/cps_e2e_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
    let db = SqliteDatabase::new_with_url(&url, 5).await?;
    db.run_migrations().await?;
    let config = helpers::auth_config();
    let app = App::new()
        .app_data(web::Data::new(UserApi::new(db.clone())))
        .app_data(web::Data::new(LedgerApi::new(db.clone())))
        .app_data(web::Data::new(TokenIssuer::new(&config)))
        .app_data(web::Data::new(TokenVerifier::new(&config)))
        .app_data(web::Data::new(stub_gateway()))
        .app_data(web::Data::new(CourseCatalog::default()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(RegisterRoute::<SqliteDatabase>::new())
        .service(
            web::scope("/api")
                .wrap(BearerAuth)
                .service(ProfileRoute::<SqliteDatabase>::new())
                .service(PaypalCreateOrderRoute::<MockGateway>::new())
                .service(PaypalCaptureRoute::<MockGateway, SqliteDatabase>::new())
                .service(MyPurchasesRoute::<SqliteDatabase>::new()),
        );
    let app = test::init_service(app).await;

    // Register and grab the session token.
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "a@b.com", "password": "pw123456", "name": "A"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    info!("register: {body}");
    assert!(status.is_success(), "was: {body}");
    let auth: AuthResponse = serde_json::from_str(&body)?;
    let bearer = ("Authorization", format!("Bearer {}", auth.token));

    // The token gets us our profile back.
    let req = TestRequest::get().uri("/api/auth/profile").insert_header(bearer.clone()).to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");
    let profile: Value = serde_json::from_str(&body)?;
    assert_eq!(profile["id"].as_str(), Some("1"));
    assert_eq!(profile["email"].as_str(), Some("a@b.com"));
    assert_eq!(profile["name"].as_str(), Some("A"));

    // Nothing bought yet.
    let req = TestRequest::get().uri("/api/purchases").insert_header(bearer.clone()).to_request();
    let res = test::call_service(&app, req).await;
    let (_, body) = helpers::status_and_body(res);
    let purchases: Value = serde_json::from_str(&body)?;
    assert_eq!(purchases["purchases"].as_array().map(Vec::len), Some(0));

    // Start a checkout; the stubbed provider hands back an approval link.
    let req = TestRequest::post()
        .uri("/api/paypal/create-order")
        .insert_header(bearer.clone())
        .set_json(json!({"course": "qa101"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");
    let order: Value = serde_json::from_str(&body)?;
    assert_eq!(order["approveUrl"].as_str(), Some(APPROVE_LINK));

    // Capture it, then the ledger shows exactly one purchase.
    let req = TestRequest::post()
        .uri("/api/paypal/capture")
        .insert_header(bearer.clone())
        .set_json(json!({"orderID": ORDER_ID, "course": "qa101"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");

    let req = TestRequest::get().uri("/api/purchases").insert_header(bearer).to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");
    let purchases: Value = serde_json::from_str(&body)?;
    let purchases = purchases["purchases"].as_array().expect("purchases array").clone();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["course"].as_str(), Some("qa101"));
    assert_eq!(purchases[0]["provider"].as_str(), Some("paypal"));
    assert_eq!(purchases[0]["provider_id"].as_str(), Some(ORDER_ID));
    Ok(())
}
