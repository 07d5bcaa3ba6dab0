use cpg_common::Secret;
use log::*;

const DEFAULT_PAYPAL_API_URL: &str = "https://api-m.sandbox.paypal.com";
const DEFAULT_MP_API_URL: &str = "https://api.mercadopago.com";
const DEFAULT_CLIENT_URL: &str = "http://localhost:5500";
const DEFAULT_BRAND_NAME: &str = "Manual del Junior";

#[derive(Debug, Clone, Default)]
pub struct PayPalConfig {
    /// Base URL of the PayPal REST API. Defaults to the sandbox; point it at the live host for
    /// production.
    pub api_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub brand_name: String,
    /// Where PayPal sends the buyer after approving the order.
    pub return_url: String,
    pub cancel_url: String,
}

impl PayPalConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("PAYPAL_API_URL").unwrap_or_else(|_| DEFAULT_PAYPAL_API_URL.to_string());
        let client_id = std::env::var("PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("PAYPAL_CLIENT_ID not set, using (probably useless) default");
            String::default()
        });
        let client_secret = Secret::new(std::env::var("PAYPAL_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("PAYPAL_CLIENT_SECRET not set, using (probably useless) default");
            String::default()
        }));
        let brand_name = std::env::var("BRAND_NAME").unwrap_or_else(|_| DEFAULT_BRAND_NAME.to_string());
        let client_url = client_url_from_env();
        Self {
            api_url,
            client_id,
            client_secret,
            brand_name,
            return_url: format!("{client_url}/paypal-success.html"),
            cancel_url: format!("{client_url}/"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MercadoPagoConfig {
    pub api_url: String,
    pub access_token: Secret<String>,
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
}

impl MercadoPagoConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("MP_API_URL").unwrap_or_else(|_| DEFAULT_MP_API_URL.to_string());
        let access_token = Secret::new(std::env::var("MP_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("MP_ACCESS_TOKEN not set, using (probably useless) default");
            String::default()
        }));
        let client_url = client_url_from_env();
        Self {
            api_url,
            access_token,
            success_url: format!("{client_url}/mp-success.html"),
            failure_url: format!("{client_url}/"),
            pending_url: format!("{client_url}/"),
        }
    }
}

fn client_url_from_env() -> String {
    let url = std::env::var("CLIENT_URL").unwrap_or_else(|_| {
        info!("CLIENT_URL not set, using {DEFAULT_CLIENT_URL} for provider redirects");
        DEFAULT_CLIENT_URL.to_string()
    });
    url.trim_end_matches('/').to_string()
}
