//! Course Payment Engine
//!
//! The course payment engine holds the state behind the course payment server: registered user
//! accounts and the append-only purchase ledger. It is provider-agnostic; talking to the actual
//! payment providers is the job of the `payment_providers` crate.
//!
//! The crate is divided into two main sections:
//! 1. Storage traits and their SQLite implementation ([`traits`], [`SqliteDatabase`]). You should
//!    never need to touch the database directly; use the public APIs instead. The exception is the
//!    record types, which are defined in [`db_types`] and are public.
//! 2. The engine public API ([`UserApi`], [`LedgerApi`]). Any backend that implements the storage
//!    traits can stand in for SQLite, which is how the server's endpoint tests run against mocks.
pub mod db_types;
pub mod traits;

mod cpe_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use cpe_api::{
    errors::{LedgerError, UserAccountError},
    ledger_api::LedgerApi,
    user_api::UserApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{InsertPurchaseResult, LedgerManagement, UserManagement};
