use serde_json::Value;

/// Extracts the buyer-facing approval link from a PayPal order response. PayPal returns a `links`
/// array; the entry with `rel == "approve"` is the one the buyer must visit.
pub fn approve_url(order: &Value) -> Option<String> {
    order["links"]
        .as_array()?
        .iter()
        .find(|link| link["rel"].as_str() == Some("approve"))
        .and_then(|link| link["href"].as_str())
        .map(String::from)
}

/// Extracts the redirect URL from a MercadoPago preference response. Sandbox credentials get a
/// `sandbox_init_point` instead of the live `init_point`.
pub fn init_point(preference: &Value) -> Option<String> {
    preference["init_point"]
        .as_str()
        .or_else(|| preference["sandbox_init_point"].as_str())
        .map(String::from)
}
