use crate::{
    db_types::{NewUser, User},
    UserAccountError,
};

/// The `UserManagement` trait defines behaviour for the credential store backend.
///
/// Password hashing and verification happen above this trait, in [`crate::UserApi`]; backends only
/// ever see the finished hash. Emails are stored normalized (trimmed, lowercased) and backends may
/// assume lookups are performed with normalized input.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Inserts a new user record. If a record with the same email already exists, the error
    /// [`UserAccountError::DuplicateEmail`] is returned. Backends must enforce this atomically
    /// (e.g. via a unique constraint) so that two concurrent registrations cannot both succeed.
    async fn insert_user(&self, user: NewUser) -> Result<User, UserAccountError>;

    /// Fetches the user with the given email, or `None` if no such user exists.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserAccountError>;

    /// Fetches the user with the given id, or `None` if no such user exists.
    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserAccountError>;
}
