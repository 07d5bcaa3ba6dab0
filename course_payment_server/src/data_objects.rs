use chrono::{DateTime, Utc};
use course_payment_engine::db_types::{Purchase, User};
use cpg_common::PaymentProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The public view of a user account. The id is rendered as a decimal string; the password hash
/// never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self { id: user.id.to_string(), email: user.email.clone(), name: user.name.clone() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub course: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureRequest {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub course: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Value,
    #[serde(rename = "approveUrl")]
    pub approve_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub capture: Value,
}

#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub preference: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<PurchaseSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseSummary {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub course: String,
    pub provider: PaymentProvider,
    pub provider_id: String,
    pub at: DateTime<Utc>,
}

impl From<Purchase> for PurchaseSummary {
    fn from(p: Purchase) -> Self {
        Self {
            user_id: p.user_id.to_string(),
            course: p.course_id,
            provider: p.provider,
            provider_id: p.provider_txn_id,
            at: p.created_at,
        }
    }
}
