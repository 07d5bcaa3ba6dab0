//! Unified API for the purchase ledger.

use std::fmt::Debug;

use log::{debug, info, warn};

use crate::{
    db_types::{NewPurchase, Purchase},
    traits::{InsertPurchaseResult, LedgerManagement},
    LedgerError,
};

/// The `LedgerApi` provides a unified API for recording and querying purchases.
pub struct LedgerApi<B> {
    db: B,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Records a completed checkout on the ledger. Recording the same provider transaction twice
    /// is not an error; the repeat is logged and the ledger is left unchanged.
    pub async fn record(&self, purchase: NewPurchase) -> Result<InsertPurchaseResult, LedgerError> {
        let provider = purchase.provider;
        let txn_id = purchase.provider_txn_id.clone();
        let result = self.db.insert_purchase(purchase).await?;
        match &result {
            InsertPurchaseResult::Inserted(id) => {
                info!("🧾️ Purchase #{id} recorded ({provider} txn {txn_id})");
            },
            InsertPurchaseResult::AlreadyRecorded => {
                warn!("🧾️ {provider} txn {txn_id} is already on the ledger, skipping");
            },
        }
        Ok(result)
    }

    /// Fetches all purchases made by the given user, oldest first.
    pub async fn purchases_for(&self, user_id: i64) -> Result<Vec<Purchase>, LedgerError> {
        let purchases = self.db.purchases_for_user(user_id).await?;
        debug!("🧾️ Fetched {} purchase(s) for user #{user_id}", purchases.len());
        Ok(purchases)
    }
}
