use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum UserAccountError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A user with this email address already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User account not found")]
    UserNotFound,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for UserAccountError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
