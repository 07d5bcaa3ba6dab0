//! # Course payment server
//!
//! This crate hosts the HTTP front end of the course payment gateway. It is responsible for:
//! * registering users and logging them in against the credential store,
//! * issuing and verifying the bearer tokens that gate every protected endpoint,
//! * initiating checkouts against the configured payment providers, and
//! * recording completed captures on the purchase ledger.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! * `/health`: liveness check.
//! * `/api/auth/register`, `/api/auth/login`: open authentication routes.
//! * `/api/auth/profile`, `/api/paypal/*`, `/api/mercadopago/*`, `/api/purchases`: protected
//!   routes, gated by the bearer-auth middleware.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
