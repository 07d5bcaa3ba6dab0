use cpg_common::{PaymentProvider, UsdAmount};
use serde_json::Value;

use crate::GatewayError;

/// The authenticated buyer a checkout is created for. The user id travels as a string because
/// providers echo it back in free-form reference fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutBuyer {
    pub user_id: String,
    pub email: String,
}

/// A provider-hosted checkout that a buyer must complete in the browser.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub provider: PaymentProvider,
    /// The provider's identifier for the checkout (PayPal order id, MercadoPago preference id).
    pub session_id: String,
    /// Where to send the buyer to approve the payment. PayPal calls this the approve link,
    /// MercadoPago the init point.
    pub redirect_url: Option<String>,
    /// The provider's full response body, passed through to the storefront untouched.
    pub raw: Value,
}

/// The result of finalizing a previously approved checkout.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub provider: PaymentProvider,
    /// The provider transaction id to record on the ledger.
    pub transaction_id: String,
    pub status: String,
    pub raw: Value,
}

/// The uniform contract every payment provider client implements.
///
/// Implementations hide credential exchange and request/response shapes; callers see only
/// normalized sessions and outcomes, with every failure collapsed into [`GatewayError`].
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    fn provider(&self) -> PaymentProvider;

    /// Starts a checkout for the given course at the given (server-side authoritative) price.
    async fn create_checkout(
        &self,
        buyer: &CheckoutBuyer,
        course_id: &str,
        price: UsdAmount,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Finalizes a checkout the buyer has approved. Providers that complete payments on their own
    /// side fail with [`GatewayError::UnsupportedOperation`].
    async fn capture_checkout(
        &self,
        buyer: &CheckoutBuyer,
        order_id: &str,
    ) -> Result<CaptureOutcome, GatewayError>;
}
