//! `SqliteDatabase` is a concrete implementation of the course payment engine storage backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use log::info;
use sqlx::SqlitePool;

use crate::{
    db_types::{NewPurchase, NewUser, Purchase, User},
    sqlite::db::{new_pool, purchases, users},
    traits::{InsertPurchaseResult, LedgerManagement, UserManagement},
    LedgerError,
    UserAccountError,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool for the given URL, creating the database file if it does not
    /// exist yet. Migrations are not run automatically; call [`SqliteDatabase::run_migrations`].
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl UserManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, UserAccountError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserAccountError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_email(email, &mut conn).await
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, UserAccountError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_id(id, &mut conn).await
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn insert_purchase(&self, purchase: NewPurchase) -> Result<InsertPurchaseResult, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        purchases::insert_purchase(purchase, &mut conn).await
    }

    async fn purchases_for_user(&self, user_id: i64) -> Result<Vec<Purchase>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        purchases::purchases_for_user(user_id, &mut conn).await
    }
}
