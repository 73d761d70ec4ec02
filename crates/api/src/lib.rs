//! Parcel address API.
//!
//! Authenticated CRUD over a user's postal addresses, with at most one
//! default address per user.
//!
//! # Architecture
//!
//! - Axum JSON API, one envelope shape for every response
//! - Sessions are issued by the auth service and read from a shared
//!   tower-sessions store
//! - `PostgreSQL` for address storage (`parcel.address`)
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use config::ApiConfig;
pub use state::AppState;
