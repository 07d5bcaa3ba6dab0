mod provider;
mod secret;
mod usd;

pub use provider::{PaymentProvider, PaymentProviderParseError};
pub use secret::Secret;
pub use usd::{UsdAmount, UsdConversionError, USD_CURRENCY_CODE};
