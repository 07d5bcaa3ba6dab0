use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use course_payment_engine::{LedgerError, UserAccountError};
use log::error;
use payment_providers::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    /// The user-facing message stays generic; the upstream detail is logged where the
    /// [`GatewayError`] is converted.
    #[error("The payment provider could not process the request")]
    PaymentGatewayError,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGatewayError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No authentication token was provided")]
    MissingToken,
    #[error("Authorization header is not in the correct format. {0}")]
    MalformedAuthHeader(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired")]
    ExpiredToken,
}

impl From<UserAccountError> for ServerError {
    fn from(e: UserAccountError) -> Self {
        match e {
            UserAccountError::DuplicateEmail | UserAccountError::InvalidCredentials => {
                Self::ValidationError(e.to_string())
            },
            UserAccountError::UserNotFound => Self::NoRecordFound(e.to_string()),
            UserAccountError::DatabaseError(m) => Self::BackendError(format!("Database error: {m}")),
            UserAccountError::HashingError(m) => Self::BackendError(m),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        error!("💳️ Payment gateway failure: {e}");
        Self::PaymentGatewayError
    }
}
