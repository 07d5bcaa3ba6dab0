use crate::{
    db_types::{NewPurchase, Purchase},
    LedgerError,
};

/// The result of trying to append a purchase to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPurchaseResult {
    /// The purchase was appended and assigned the given row id.
    Inserted(i64),
    /// A purchase with the same `(provider, provider_txn_id)` pair is already on the ledger.
    /// Nothing was written.
    AlreadyRecorded,
}

/// The `LedgerManagement` trait defines behaviour for the purchase ledger backend.
///
/// The ledger is append-only. Repeated capture callbacks from a provider must not produce
/// duplicate entries, so backends deduplicate on `(provider, provider_txn_id)`.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Appends a purchase record. This function must be idempotent: recording the same
    /// `(provider, provider_txn_id)` pair twice returns
    /// [`InsertPurchaseResult::AlreadyRecorded`] and leaves the ledger unchanged.
    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<InsertPurchaseResult, LedgerError>;

    /// Fetches all purchases for the given user, in insertion order. Users with no purchases get
    /// an empty vector, not an error.
    async fn purchases_for_user(&self, user_id: i64) -> Result<Vec<Purchase>, LedgerError>;
}
