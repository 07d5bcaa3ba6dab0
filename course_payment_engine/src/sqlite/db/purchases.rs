use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPurchase, Purchase},
    traits::InsertPurchaseResult,
    LedgerError,
};

/// Appends a purchase to the ledger. The `(provider, provider_txn_id)` unique index turns a
/// repeated capture into a no-op insert, which is reported as `AlreadyRecorded`.
pub async fn insert_purchase(
    purchase: NewPurchase,
    conn: &mut SqliteConnection,
) -> Result<InsertPurchaseResult, LedgerError> {
    let created_at = Utc::now();
    let res = sqlx::query(
        r#"INSERT INTO purchases (user_id, course_id, provider, provider_txn_id, created_at)
           VALUES ($1, $2, $3, $4, $5)
           ON CONFLICT (provider, provider_txn_id) DO NOTHING"#,
    )
    .bind(purchase.user_id)
    .bind(&purchase.course_id)
    .bind(purchase.provider)
    .bind(&purchase.provider_txn_id)
    .bind(created_at)
    .execute(conn)
    .await?;
    if res.rows_affected() == 0 {
        return Ok(InsertPurchaseResult::AlreadyRecorded);
    }
    let id = res.last_insert_rowid();
    trace!("🧾️ Inserted purchase #{id} for user #{}", purchase.user_id);
    Ok(InsertPurchaseResult::Inserted(id))
}

pub async fn purchases_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Purchase>, LedgerError> {
    let purchases = sqlx::query_as::<_, Purchase>(
        r#"SELECT id, user_id, course_id, provider, provider_txn_id, created_at
           FROM purchases WHERE user_id = $1 ORDER BY id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(purchases)
}
