//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (I/O, database
//! access, calls to the payment providers, etc.) must be expressed as futures or asynchronous functions. Async handlers
//! get executed concurrently by worker threads and thus don't block execution. The one CPU-heavy job in this server,
//! password hashing, is pushed onto the blocking pool inside the engine.
use actix_web::{get, web, HttpResponse, Responder};
use course_payment_engine::{
    db_types::NewPurchase,
    traits::{LedgerManagement, UserManagement},
    LedgerApi,
    UserApi,
};
use log::*;
use payment_providers::{CheckoutBuyer, PaymentGateway};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::CourseCatalog,
    data_objects::{
        AuthResponse,
        CaptureRequest,
        CaptureResponse,
        CheckoutRequest,
        CreateOrderResponse,
        LoginRequest,
        PreferenceResponse,
        PurchaseSummary,
        PurchasesResponse,
        RegisterRequest,
        UserProfile,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(register => Post "/api/auth/register" impl UserManagement);
/// Route handler for the registration endpoint
///
/// Creates a new user account and immediately issues an access token for it, so the storefront
/// can log the user in off the back of a successful registration. Fails with a 400 if either
/// required field is missing or the email is already taken.
pub async fn register<B: UserManagement>(
    body: web::Json<RegisterRequest>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received registration request");
    let RegisterRequest { email, password, name } = body.into_inner();
    if email.trim().is_empty() || password.is_empty() {
        return Err(ServerError::ValidationError("email and password are required".to_string()));
    }
    let user = api.register(&email, &password, name).await?;
    let token = signer.issue_token(&user, None)?;
    debug!("💻️ Registered user #{}", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse { token, user: UserProfile::from(&user) }))
}

route!(login => Post "/api/auth/login" impl UserManagement);
/// Route handler for the login endpoint
///
/// Checks the submitted credentials and issues a fresh access token. The error for a wrong
/// password is indistinguishable from the error for an unknown email.
pub async fn login<B: UserManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received login request");
    let LoginRequest { email, password } = body.into_inner();
    let user = api.authenticate(&email, &password).await?;
    let token = signer.issue_token(&user, None)?;
    debug!("💻️ Issued access token for user #{}", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse { token, user: UserProfile::from(&user) }))
}

route!(profile => Get "/auth/profile" impl UserManagement);
/// Route handler for the profile endpoint
///
/// Returns the account behind the access token that is supplied in the `Authorization` header.
pub async fn profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET profile for user #{}", claims.sub);
    let user = api.user_by_id(claims.user_id()?).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(paypal_create_order => Post "/paypal/create-order" impl PaymentGateway);
/// Route handler for the PayPal create-order endpoint
///
/// Starts a PayPal checkout for the given course. The price charged comes from the server-side
/// course catalog; the client never submits an amount. The response carries the provider's order
/// object plus the approval URL the buyer must be sent to.
pub async fn paypal_create_order<G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    gateway: web::Data<G>,
    catalog: web::Data<CourseCatalog>,
) -> Result<HttpResponse, ServerError> {
    let course = body.into_inner().course;
    let price = lookup_price(&catalog, &course)?;
    let buyer = buyer_from_claims(&claims);
    debug!("💻️ Creating {} checkout of {course} for user #{}", gateway.provider(), claims.sub);
    let session = gateway.create_checkout(&buyer, &course, price).await?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse { approve_url: session.redirect_url.clone(), order: session.raw }))
}

route!(paypal_capture => Post "/paypal/capture" impl PaymentGateway, LedgerManagement);
/// Route handler for the PayPal capture endpoint
///
/// Finalizes a checkout the buyer approved and appends the purchase to the ledger. Recording is
/// idempotent, so a storefront retrying this call cannot produce duplicate ledger entries.
pub async fn paypal_capture<G: PaymentGateway, B: LedgerManagement>(
    claims: JwtClaims,
    body: web::Json<CaptureRequest>,
    gateway: web::Data<G>,
    ledger: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CaptureRequest { order_id, course } = body.into_inner();
    let buyer = buyer_from_claims(&claims);
    debug!("💻️ Capturing {} order {order_id} for user #{}", gateway.provider(), claims.sub);
    let outcome = gateway.capture_checkout(&buyer, &order_id).await?;
    let purchase = NewPurchase {
        user_id: claims.user_id()?,
        course_id: course,
        provider: outcome.provider,
        provider_txn_id: outcome.transaction_id.clone(),
    };
    ledger.record(purchase).await?;
    Ok(HttpResponse::Ok().json(CaptureResponse { capture: outcome.raw }))
}

route!(mercadopago_create_preference => Post "/mercadopago/create-preference" impl PaymentGateway);
/// Route handler for the MercadoPago create-preference endpoint
///
/// Creates a MercadoPago checkout preference for the given course. Completion happens entirely on
/// the provider side after the redirect; there is no capture counterpart for this provider.
pub async fn mercadopago_create_preference<G: PaymentGateway>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    gateway: web::Data<G>,
    catalog: web::Data<CourseCatalog>,
) -> Result<HttpResponse, ServerError> {
    let course = body.into_inner().course;
    let price = lookup_price(&catalog, &course)?;
    let buyer = buyer_from_claims(&claims);
    debug!("💻️ Creating {} checkout of {course} for user #{}", gateway.provider(), claims.sub);
    let session = gateway.create_checkout(&buyer, &course, price).await?;
    Ok(HttpResponse::Ok().json(PreferenceResponse { preference: session.raw }))
}

//----------------------------------------------   Purchases  ----------------------------------------------------
route!(my_purchases => Get "/purchases" impl LedgerManagement);
/// Route handler for the purchases endpoint
///
/// Returns the purchases of the user behind the access token, oldest first. There is no endpoint
/// for querying other users' purchases.
pub async fn my_purchases<B: LedgerManagement>(
    claims: JwtClaims,
    ledger: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET purchases for user #{}", claims.sub);
    let purchases = ledger.purchases_for(claims.user_id()?).await?;
    let purchases = purchases.into_iter().map(PurchaseSummary::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(PurchasesResponse { purchases }))
}

fn lookup_price(catalog: &CourseCatalog, course: &str) -> Result<cpg_common::UsdAmount, ServerError> {
    if course.trim().is_empty() {
        return Err(ServerError::ValidationError("course is required".to_string()));
    }
    catalog.price_for(course).ok_or_else(|| {
        debug!("💻️ No price on record for course '{course}'");
        ServerError::ValidationError(format!("Unknown course: {course}"))
    })
}

fn buyer_from_claims(claims: &JwtClaims) -> CheckoutBuyer {
    CheckoutBuyer { user_id: claims.sub.clone(), email: claims.email.clone() }
}
