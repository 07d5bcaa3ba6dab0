use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use course_payment_engine::{LedgerApi, SqliteDatabase, UserApi};
use payment_providers::{MercadoPagoApi, PayPalApi};

use crate::{
    auth::{TokenIssuer, TokenVerifier},
    config::ServerConfig,
    errors::ServerError,
    middleware::BearerAuth,
    routes::{
        health,
        LoginRoute,
        MercadopagoCreatePreferenceRoute,
        MyPurchasesRoute,
        PaypalCaptureRoute,
        PaypalCreateOrderRoute,
        ProfileRoute,
        RegisterRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let paypal = PayPalApi::new(config.paypal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mercado_pago =
        MercadoPagoApi::new(config.mercado_pago.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let user_api = UserApi::new(db.clone());
        let ledger_api = LedgerApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        let token_verifier = TokenVerifier::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cps::access_log"))
            .wrap(Cors::permissive())
            .app_data(web::Data::new(user_api))
            .app_data(web::Data::new(ledger_api))
            .app_data(web::Data::new(token_issuer))
            .app_data(web::Data::new(token_verifier))
            .app_data(web::Data::new(paypal.clone()))
            .app_data(web::Data::new(mercado_pago.clone()))
            .app_data(web::Data::new(config.catalog.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler));
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .wrap(BearerAuth)
            .service(ProfileRoute::<SqliteDatabase>::new())
            .service(PaypalCreateOrderRoute::<PayPalApi>::new())
            .service(PaypalCaptureRoute::<PayPalApi, SqliteDatabase>::new())
            .service(MercadopagoCreatePreferenceRoute::<MercadoPagoApi>::new())
            .service(MyPurchasesRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Failed body deserialization must come back in the same JSON error shape as every other
/// failure, not actix's default plain-text response.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServerError::InvalidRequestBody(err.to_string()).into()
}
