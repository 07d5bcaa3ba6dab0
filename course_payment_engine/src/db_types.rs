use chrono::{DateTime, Utc};
use cpg_common::PaymentProvider;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//--------------------------------------        User        ----------------------------------------------------------

/// A registered user account. Created on registration and never mutated or deleted afterwards.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// The bcrypt hash of the user's password. The plaintext is never stored.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The fields needed to create a new user record. The email must already be normalized and the
/// password already hashed; see [`crate::UserApi::register`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Lowercase and trim an email address. Lookups and inserts both go through this, so
/// `A@B.com` and `a@b.com` refer to the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

//--------------------------------------      Purchase      ----------------------------------------------------------

/// A single entry in the purchase ledger. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub user_id: i64,
    pub course_id: String,
    pub provider: PaymentProvider,
    /// The provider's identifier for the transaction (PayPal order id, MercadoPago payment id).
    /// Unique per provider; the ledger uses it to deduplicate repeated capture callbacks.
    pub provider_txn_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user_id: i64,
    pub course_id: String,
    pub provider: PaymentProvider,
    pub provider_txn_id: String,
}
