//! Unified API for registering and authenticating users.

use std::fmt::Debug;

use log::{debug, trace};
use tokio::task;

use crate::{
    db_types::{normalize_email, NewUser, User},
    traits::UserManagement,
    UserAccountError,
};

/// The bcrypt cost factor used for password hashes.
const BCRYPT_COST: u32 = 10;

/// A syntactically valid bcrypt hash that no password was ever hashed to in this system. When a
/// login names an unknown email, we still verify against this hash so that the unknown-email and
/// wrong-password paths do comparable work.
const DUMMY_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// The `UserApi` provides a unified API for the credential store.
///
/// All password handling lives here: hashing on registration, verification on login. The backend
/// only ever stores and returns the finished hash. Hashing is deliberately slow (bcrypt, cost
/// factor [`BCRYPT_COST`]) and is pushed onto the blocking thread pool so that request workers are
/// not stalled.
pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers a new user. The email is normalized before storage; a duplicate email fails with
    /// [`UserAccountError::DuplicateEmail`]. The returned record carries the assigned id.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, UserAccountError> {
        let email = normalize_email(email);
        trace!("🧑️ Registering new user account for {email}");
        let password_hash = hash_password(password.to_string()).await?;
        let user = NewUser { email, name: name.unwrap_or_default(), password_hash };
        let user = self.db.insert_user(user).await?;
        debug!("🧑️ New user account #{} created for {}", user.id, user.email);
        Ok(user)
    }

    /// Checks the given credentials against the store. Returns the matching user on success.
    ///
    /// Both failure modes (unknown email, wrong password) collapse into
    /// [`UserAccountError::InvalidCredentials`] so that a caller cannot tell which of the two was
    /// wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserAccountError> {
        let email = normalize_email(email);
        let user = self.db.fetch_user_by_email(&email).await?;
        match user {
            Some(user) => {
                let valid = verify_password(password.to_string(), user.password_hash.clone()).await?;
                if valid {
                    debug!("🧑️ User #{} authenticated", user.id);
                    Ok(user)
                } else {
                    debug!("🧑️ Password mismatch for {email}");
                    Err(UserAccountError::InvalidCredentials)
                }
            },
            None => {
                // Burn the same bcrypt work as the happy path before rejecting.
                let _ = verify_password(password.to_string(), DUMMY_HASH.to_string()).await;
                debug!("🧑️ Login attempt for unknown email {email}");
                Err(UserAccountError::InvalidCredentials)
            },
        }
    }

    /// Fetches the user with the given id, failing with [`UserAccountError::UserNotFound`] if no
    /// such account exists.
    pub async fn user_by_id(&self, id: i64) -> Result<User, UserAccountError> {
        self.db.fetch_user_by_id(id).await?.ok_or(UserAccountError::UserNotFound)
    }
}

async fn hash_password(password: String) -> Result<String, UserAccountError> {
    task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| UserAccountError::HashingError(e.to_string()))?
        .map_err(|e| UserAccountError::HashingError(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, UserAccountError> {
    task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| UserAccountError::HashingError(e.to_string()))?
        .map_err(|e| UserAccountError::HashingError(e.to_string()))
}
