//! REST clients for the supported payment providers.
//!
//! Each provider (PayPal, MercadoPago) hides its own credential exchange and wire format behind
//! the [`PaymentGateway`] trait, so the server talks to every provider through the same two
//! operations: create a checkout, capture a checkout. Adding a provider means adding an
//! implementation here; no call site changes.
mod config;
mod error;
mod gateway;
mod mercado_pago;
mod paypal;

pub mod helpers;

pub use config::{MercadoPagoConfig, PayPalConfig};
pub use error::GatewayError;
pub use gateway::{CaptureOutcome, CheckoutBuyer, CheckoutSession, PaymentGateway};
pub use mercado_pago::MercadoPagoApi;
pub use paypal::PayPalApi;
