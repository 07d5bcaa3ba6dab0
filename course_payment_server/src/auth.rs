use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use course_payment_engine::db_types::User;
use futures::future::{ready, Ready};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError, errors::ServerError};

/// Access tokens are valid for this many days after issuance.
const TOKEN_VALIDITY_DAYS: i64 = 7;

/// The claims carried by an access token. The token is stateless: the server keeps no session
/// record, so a token is valid iff its signature verifies and it has not expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id, as a decimal string.
    pub sub: String,
    pub email: String,
    /// Expiration, as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::ValidationError("token subject is not a user id".to_string()))
    }
}

/// Handlers take `JwtClaims` as an extractor; the bearer-auth middleware has placed the verified
/// claims in the request extensions by the time a protected handler runs.
impl FromRequest for JwtClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .ok_or_else(|| ServerError::AuthenticationError(AuthError::MissingToken).into());
        ready(claims)
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key }
    }

    /// Issue a new access token for the given user. The caller must have authenticated the user
    /// before calling this.
    pub fn issue_token(&self, user: &User, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::days(TOKEN_VALIDITY_DAYS));
        let claims = JwtClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: (Utc::now() + duration).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(token)
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { decoding_key }
    }

    /// Validates signature and expiry (no leeway) and returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<JwtClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => {
                debug!("🔑️ Access token validated for {}", data.claims.email);
                Ok(data.claims)
            },
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::ExpiredToken),
            Err(e) => Err(AuthError::ValidationError(e.to_string())),
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value. Anything else — a
/// different scheme, a missing token, embedded whitespace — is rejected before verification is
/// attempted.
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();
    if scheme != "Bearer" {
        return Err(AuthError::MalformedAuthHeader(format!("unsupported scheme '{scheme}'")));
    }
    if token.is_empty() {
        return Err(AuthError::MalformedAuthHeader("no token after scheme".to_string()));
    }
    if parts.next().is_some() {
        return Err(AuthError::MalformedAuthHeader("unexpected whitespace".to_string()));
    }
    Ok(token)
}
