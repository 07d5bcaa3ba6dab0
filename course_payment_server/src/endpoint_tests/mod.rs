mod auth;
mod e2e;
