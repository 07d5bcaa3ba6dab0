use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// The payment providers the gateway can initiate checkouts against.
///
/// The string representation ("paypal", "mercadopago") is shared by the database, the JSON API and
/// the log output, so all conversions funnel through the impls below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentProvider {
    PayPal,
    MercadoPago,
}

#[derive(Debug, Clone, Error)]
#[error("'{0}' is not a known payment provider")]
pub struct PaymentProviderParseError(pub String);

impl Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::PayPal => write!(f, "paypal"),
            PaymentProvider::MercadoPago => write!(f, "mercadopago"),
        }
    }
}

impl FromStr for PaymentProvider {
    type Err = PaymentProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paypal" => Ok(PaymentProvider::PayPal),
            "mercadopago" => Ok(PaymentProvider::MercadoPago),
            _ => Err(PaymentProviderParseError(s.to_string())),
        }
    }
}
