use actix_web::{test, test::TestRequest, web, App};
use chrono::{Duration, Utc};
use course_payment_engine::{db_types::User, UserAccountError, UserApi};
use log::*;
use serde_json::json;

use super::{helpers, mocks::MockUserDb};
use crate::{
    auth::{TokenIssuer, TokenVerifier},
    data_objects::{AuthResponse, UserProfile},
    middleware::BearerAuth,
    routes::{LoginRoute, ProfileRoute, RegisterRoute},
    server::json_error_handler,
};

fn configure_app(users: MockUserDb, config: &crate::config::AuthConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let config = config.clone();
    move |cfg| {
        cfg.app_data(web::Data::new(UserApi::new(users)))
            .app_data(web::Data::new(TokenIssuer::new(&config)))
            .app_data(web::Data::new(TokenVerifier::new(&config)))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(RegisterRoute::<MockUserDb>::new())
            .service(LoginRoute::<MockUserDb>::new())
            .service(web::scope("/api").wrap(BearerAuth).service(ProfileRoute::<MockUserDb>::new()));
    }
}

#[actix_web::test]
async fn register_returns_token_and_user() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users.expect_insert_user().returning(|u| {
        Ok(User { id: 1, email: u.email, name: u.name, password_hash: u.password_hash, created_at: Utc::now() })
    });
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "a@b.com", "password": "pw123456", "name": "A"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    info!("Response body: {body}");
    assert!(status.is_success(), "was: {body}");
    let response: AuthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(
        response.user,
        UserProfile { id: "1".to_string(), email: "a@b.com".to_string(), name: "A".to_string() }
    );
    let claims = TokenVerifier::new(&config).verify(&response.token).expect("token must verify");
    assert_eq!(claims.sub, "1");
    assert_eq!(claims.email, "a@b.com");
    let expiry = claims.exp - Utc::now().timestamp();
    assert!(expiry > 6 * 86_400 && expiry <= 7 * 86_400, "expiry was {expiry}s");
}

#[actix_web::test]
async fn register_rejects_missing_fields() {
    let _ = env_logger::try_init();
    let users = MockUserDb::new();
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "", "password": ""}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"email and password are required"}"#);
}

#[actix_web::test]
async fn register_with_unreadable_body_is_a_400() {
    let _ = env_logger::try_init();
    let users = MockUserDb::new();
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    // No password field at all: deserialization fails before the handler runs.
    let req = TestRequest::post().uri("/api/auth/register").set_json(json!({"email": "a@b.com"})).to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 400);
    assert!(body.contains("Could not read request body"), "was: {body}");
}

#[actix_web::test]
async fn register_rejects_duplicate_emails() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users.expect_insert_user().returning(|_| Err(UserAccountError::DuplicateEmail));
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "a@b.com", "password": "pw123456"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 400);
    assert_eq!(body, r#"{"error":"A user with this email address already exists"}"#);
}

#[actix_web::test]
async fn login_succeeds_with_the_correct_password() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users
        .expect_fetch_user_by_email()
        .returning(|email| Ok(Some(helpers::test_user(1, email, "A"))));
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "pw123456"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");
    let response: AuthResponse = serde_json::from_str(&body).unwrap();
    let claims = TokenVerifier::new(&config).verify(&response.token).expect("token must verify");
    assert_eq!(claims.email, "a@b.com");
}

#[actix_web::test]
async fn login_failures_do_not_say_which_credential_was_wrong() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users.expect_fetch_user_by_email().withf(|email| email == "a@b.com").returning(|email| {
        Ok(Some(helpers::test_user(1, email, "A")))
    });
    users.expect_fetch_user_by_email().returning(|_| Ok(None));
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;

    let wrong_password = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "not-the-password"}))
        .to_request();
    let res = test::call_service(&app, wrong_password).await;
    let (status, body_wrong_password) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 400);

    let unknown_email = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "nobody@b.com", "password": "pw123456"}))
        .to_request();
    let res = test::call_service(&app, unknown_email).await;
    let (status, body_unknown_email) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 400);

    assert_eq!(body_wrong_password, body_unknown_email);
    assert_eq!(body_wrong_password, r#"{"error":"Invalid email or password"}"#);
}

//----------------------------------------------   Middleware  ----------------------------------------------------

async fn get_profile(app_users: MockUserDb, auth_header: Option<&str>) -> (u16, String) {
    let config = helpers::auth_config();
    let app = test::init_service(App::new().configure(configure_app(app_users, &config))).await;
    let mut req = TestRequest::get().uri("/api/auth/profile");
    if let Some(header) = auth_header {
        req = req.insert_header(("Authorization", header));
    }
    let res = test::call_service(&app, req.to_request()).await;
    let (status, body) = helpers::status_and_body(res);
    (status.as_u16(), body)
}

#[actix_web::test]
async fn profile_without_a_token_is_rejected() {
    let _ = env_logger::try_init();
    let (status, body) = get_profile(MockUserDb::new(), None).await;
    assert_eq!(status, 401);
    assert!(body.contains("No authentication token was provided"), "was: {body}");
}

#[actix_web::test]
async fn profile_with_the_wrong_scheme_is_rejected_before_verification() {
    let _ = env_logger::try_init();
    // The mock has no expectations: reaching the store would panic the handler. A malformed
    // header must fail in the middleware instead.
    let (status, body) = get_profile(MockUserDb::new(), Some("Token abc")).await;
    assert_eq!(status, 401);
    assert!(body.contains("Authorization header is not in the correct format"), "was: {body}");

    let (status, _) = get_profile(MockUserDb::new(), Some("Bearer a b")).await;
    assert_eq!(status, 401);
    let (status, _) = get_profile(MockUserDb::new(), Some("Bearer")).await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn profile_with_a_garbage_token_is_rejected() {
    let _ = env_logger::try_init();
    let (status, body) = get_profile(MockUserDb::new(), Some("Bearer made.up.nonsense")).await;
    assert_eq!(status, 401);
    assert!(body.contains("Access token is invalid"), "was: {body}");
}

#[actix_web::test]
async fn profile_with_an_expired_token_is_rejected() {
    let _ = env_logger::try_init();
    let config = helpers::auth_config();
    let user = helpers::test_user(1, "a@b.com", "A");
    let token = TokenIssuer::new(&config)
        .issue_token(&user, Some(Duration::seconds(-3600)))
        .expect("token issuance");
    let header = format!("Bearer {token}");
    let (status, body) = get_profile(MockUserDb::new(), Some(&header)).await;
    assert_eq!(status, 401);
    assert_eq!(body, r#"{"error":"Authentication Error. Access token has expired"}"#);
}

#[actix_web::test]
async fn profile_returns_the_token_holders_account() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users
        .expect_fetch_user_by_id()
        .with(mockall::predicate::eq(1i64))
        .returning(|id| Ok(Some(helpers::test_user(id, "a@b.com", "A"))));
    let config = helpers::auth_config();
    let user = helpers::test_user(1, "a@b.com", "A");
    let token = TokenIssuer::new(&config).issue_token(&user, None).expect("token issuance");
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert!(status.is_success(), "was: {body}");
    let profile: UserProfile = serde_json::from_str(&body).unwrap();
    assert_eq!(profile, UserProfile { id: "1".to_string(), email: "a@b.com".to_string(), name: "A".to_string() });
}

#[actix_web::test]
async fn profile_for_a_vanished_account_is_a_404() {
    let _ = env_logger::try_init();
    let mut users = MockUserDb::new();
    users.expect_fetch_user_by_id().returning(|_| Ok(None));
    let config = helpers::auth_config();
    let user = helpers::test_user(42, "ghost@b.com", "");
    let token = TokenIssuer::new(&config).issue_token(&user, None).expect("token issuance");
    let app = test::init_service(App::new().configure(configure_app(users, &config))).await;
    let req = TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    let (status, body) = helpers::status_and_body(res);
    assert_eq!(status.as_u16(), 404, "was: {body}");
}
