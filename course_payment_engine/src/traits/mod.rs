//! # Storage traits
//!
//! This module defines the interface contracts that payment engine storage *backends* must
//! implement.
//!
//! * [`UserManagement`] covers the credential store: inserting and looking up user accounts.
//! * [`LedgerManagement`] covers the purchase ledger: recording completed checkouts and querying
//!   them per user.
//!
//! [`crate::SqliteDatabase`] implements both. The server's endpoint tests substitute mockall mocks
//! for either trait, which is the reason the engine APIs are generic over them rather than bound
//! to SQLite.
mod ledger_management;
mod user_management;

pub use ledger_management::{InsertPurchaseResult, LedgerManagement};
pub use user_management::UserManagement;
