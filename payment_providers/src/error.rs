use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Credential exchange with the provider failed: {0}")]
    OAuthError(String),
    #[error("The provider response is missing '{0}'")]
    MissingField(String),
    #[error("Operation not supported: {0}")]
    UnsupportedOperation(String),
}
