//! SQLite backend for the course payment engine.
mod sqlite_impl;

pub mod db;

pub use sqlite_impl::SqliteDatabase;
