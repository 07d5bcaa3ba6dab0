//! Bearer-token authentication middleware for the course payment server.
//! This middleware can be placed on any route or service.
//!
//! It extracts the access token from the `Authorization: Bearer <token>` header, verifies it, and
//! places the resulting [`JwtClaims`] in the request extensions for handlers to pick up via the
//! `FromRequest` extractor. Extraction or verification failure terminates the request with a 401
//! JSON error; there is no retry.

use std::pin::Pin;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, HttpResponse};
use futures::future::{ok, Ready};
use futures::Future;

use crate::auth::{extract_bearer_token, JwtClaims, TokenVerifier};
use crate::errors::{AuthError, ServerError};

pub struct BearerAuth;

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = BearerAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(BearerAuthService { service: Rc::new(service) })
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let verifier = match req.app_data::<web::Data<TokenVerifier>>().cloned() {
                Some(verifier) => verifier,
                None => {
                    log::warn!("No token verifier found in app data");
                    let res = req
                        .into_response(HttpResponse::InternalServerError().body("No token verifier found in app data"));
                    return Ok(res.map_into_right_body());
                },
            };
            match authenticate_request(&req, verifier.get_ref()) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    log::debug!("🔑️ Rejecting request: {e}");
                    let res = req.into_response(ServerError::AuthenticationError(e).error_response());
                    Ok(res.map_into_right_body())
                },
            }
        })
    }
}

fn authenticate_request(req: &ServiceRequest, verifier: &TokenVerifier) -> Result<JwtClaims, AuthError> {
    let header = req.headers().get(header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let header =
        header.to_str().map_err(|_| AuthError::MalformedAuthHeader("non-ASCII header value".to_string()))?;
    let token = extract_bearer_token(header)?;
    verifier.verify(token)
}
