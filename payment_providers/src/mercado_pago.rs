use std::{sync::Arc, time::Duration};

use cpg_common::{PaymentProvider, UsdAmount};
use log::*;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::MercadoPagoConfig,
    gateway::{CaptureOutcome, CheckoutBuyer, CheckoutSession, PaymentGateway},
    helpers::init_point,
    GatewayError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for MercadoPago's checkout-preference REST API.
///
/// MercadoPago completes payments on its own side after the buyer is redirected; there is no
/// capture step for the server to perform. Confirmation would arrive via webhook, which this
/// gateway does not implement, so no MercadoPago purchase is ever recorded here.
#[derive(Clone)]
pub struct MercadoPagoApi {
    config: MercadoPagoConfig,
    client: Arc<Client>,
}

impl MercadoPagoApi {
    pub fn new(config: MercadoPagoConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates a checkout preference for a single course. The buyer's id and course id travel in
    /// `external_reference` so the provider's reports can be matched back to our records.
    pub async fn create_preference(
        &self,
        buyer: &CheckoutBuyer,
        course_id: &str,
        price: UsdAmount,
    ) -> Result<Value, GatewayError> {
        let body = serde_json::json!({
            "items": [{ "title": course_id, "quantity": 1, "unit_price": price.to_dollars_f64() }],
            "payer": { "email": buyer.email },
            "external_reference": format!("{}_{}", buyer.user_id, course_id),
            "back_urls": {
                "success": self.config.success_url,
                "failure": self.config.failure_url,
                "pending": self.config.pending_url,
            },
            "auto_return": "approved",
        });
        debug!("Creating MercadoPago preference for course {course_id} at {price}");
        let url = self.url("/checkout/preferences");
        trace!("Sending REST query: {url}");
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.access_token.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            let preference =
                response.json::<Value>().await.map_err(|e| GatewayError::JsonError(e.to_string()))?;
            info!("Created MercadoPago preference {}", preference["id"].as_str().unwrap_or("<no id>"));
            Ok(preference)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
            Err(GatewayError::QueryError { status, message })
        }
    }
}

impl PaymentGateway for MercadoPagoApi {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::MercadoPago
    }

    async fn create_checkout(
        &self,
        buyer: &CheckoutBuyer,
        course_id: &str,
        price: UsdAmount,
    ) -> Result<CheckoutSession, GatewayError> {
        let raw = self.create_preference(buyer, course_id, price).await?;
        let session_id = raw["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GatewayError::MissingField("id".to_string()))?;
        let redirect_url = init_point(&raw);
        Ok(CheckoutSession { provider: PaymentProvider::MercadoPago, session_id, redirect_url, raw })
    }

    async fn capture_checkout(
        &self,
        _buyer: &CheckoutBuyer,
        _order_id: &str,
    ) -> Result<CaptureOutcome, GatewayError> {
        Err(GatewayError::UnsupportedOperation(
            "MercadoPago payments complete on the provider side; there is no capture call".to_string(),
        ))
    }
}
