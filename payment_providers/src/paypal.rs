use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use cpg_common::{PaymentProvider, UsdAmount, USD_CURRENCY_CODE};
use log::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    config::PayPalConfig,
    gateway::{CaptureOutcome, CheckoutBuyer, CheckoutSession, PaymentGateway},
    helpers::approve_url,
    GatewayError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh the cached OAuth token this long before the provider says it expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedAccessToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Client for PayPal's checkout REST API.
///
/// PayPal authenticates API calls with a short-lived access token obtained via a
/// client-credentials exchange. The token is cached until shortly before its advertised expiry so
/// that each checkout action does not pay an extra round trip.
#[derive(Clone)]
pub struct PayPalApi {
    config: PayPalConfig,
    client: Arc<Client>,
    token: Arc<RwLock<Option<CachedAccessToken>>>,
}

impl PayPalApi {
    pub fn new(config: PayPalConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(RwLock::new(None)) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Returns a valid access token, performing the client-credentials exchange only when the
    /// cached one is missing or about to expire.
    async fn access_token(&self) -> Result<String, GatewayError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.is_fresh() {
                trace!("Reusing cached PayPal access token");
                return Ok(cached.token.clone());
            }
        }
        let fresh = self.fetch_access_token().await?;
        let token = fresh.token.clone();
        *self.token.write().await = Some(fresh);
        Ok(token)
    }

    async fn fetch_access_token(&self) -> Result<CachedAccessToken, GatewayError> {
        debug!("Requesting a new PayPal access token");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::OAuthError(format!("status {status}: {message}")));
        }
        let token =
            response.json::<AccessTokenResponse>().await.map_err(|e| GatewayError::JsonError(e.to_string()))?;
        let expires_at = Utc::now() + chrono::Duration::seconds(token.expires_in);
        info!("Obtained PayPal access token, valid until {expires_at}");
        Ok(CachedAccessToken { token: token.access_token, expires_at })
    }

    async fn rest_post(&self, path: &str, body: Option<Value>) -> Result<Value, GatewayError> {
        let token = self.access_token().await?;
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.post(url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| GatewayError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
            Err(GatewayError::QueryError { status, message })
        }
    }

    /// Creates a checkout order with capture intent. The response carries the links the buyer
    /// needs to approve the payment.
    pub async fn create_order(&self, course_id: &str, price: UsdAmount) -> Result<Value, GatewayError> {
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": { "currency_code": USD_CURRENCY_CODE, "value": price.to_string() },
                "description": course_id,
            }],
            "application_context": {
                "brand_name": self.config.brand_name,
                "landing_page": "NO_PREFERENCE",
                "user_action": "PAY_NOW",
                "return_url": self.config.return_url,
                "cancel_url": self.config.cancel_url,
            },
        });
        debug!("Creating PayPal order for course {course_id} at {price}");
        let order = self.rest_post("/v2/checkout/orders", Some(body)).await?;
        info!("Created PayPal order {}", order["id"].as_str().unwrap_or("<no id>"));
        Ok(order)
    }

    pub async fn capture_order(&self, order_id: &str) -> Result<Value, GatewayError> {
        debug!("Capturing PayPal order {order_id}");
        let capture = self.rest_post(&format!("/v2/checkout/orders/{order_id}/capture"), None).await?;
        info!("Captured PayPal order {order_id}");
        Ok(capture)
    }
}

impl PaymentGateway for PayPalApi {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::PayPal
    }

    async fn create_checkout(
        &self,
        _buyer: &CheckoutBuyer,
        course_id: &str,
        price: UsdAmount,
    ) -> Result<CheckoutSession, GatewayError> {
        let raw = self.create_order(course_id, price).await?;
        let session_id = raw["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GatewayError::MissingField("id".to_string()))?;
        let redirect_url = approve_url(&raw);
        if redirect_url.is_none() {
            warn!("PayPal order {session_id} has no approve link");
        }
        Ok(CheckoutSession { provider: PaymentProvider::PayPal, session_id, redirect_url, raw })
    }

    async fn capture_checkout(
        &self,
        _buyer: &CheckoutBuyer,
        order_id: &str,
    ) -> Result<CaptureOutcome, GatewayError> {
        let raw = self.capture_order(order_id).await?;
        let status = raw["status"].as_str().unwrap_or("UNKNOWN").to_string();
        Ok(CaptureOutcome {
            provider: PaymentProvider::PayPal,
            transaction_id: order_id.to_string(),
            status,
            raw,
        })
    }
}
