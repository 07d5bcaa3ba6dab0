//! The engine's public API surface. [`user_api::UserApi`] wraps a [`crate::UserManagement`]
//! backend with registration and credential-checking logic; [`ledger_api::LedgerApi`] wraps a
//! [`crate::LedgerManagement`] backend.
pub mod errors;
pub mod ledger_api;
pub mod user_api;
