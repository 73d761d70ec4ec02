//! Address storage.
//!
//! # Database: `parcel`
//!
//! ## Tables
//!
//! - `parcel.address` - User postal addresses
//! - `tower_sessions.session` - Session records, written by the auth service
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p parcel-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers never talk to a database directly; they go through the
//! [`AddressStore`] trait.
//!
//! - [`PgAddressStore`] - `PostgreSQL`, used in production
//! - [`InMemoryAddressStore`] - process-local, used by tests and local development

pub mod addresses;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use parcel_core::{Address, AddressChanges, AddressId, NewAddress, UserId};

pub use addresses::PgAddressStore;
pub use memory::InMemoryAddressStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., a second default address).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistent address records.
///
/// Every mutating method is scoped by owner: a row that exists but belongs
/// to someone else behaves exactly like a missing row.
///
/// Any write that leaves an address with `is_default = true` must clear the
/// owner's other defaults in the same atomic step.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Insert a new address for `owner`.
    async fn create(&self, owner: UserId, address: NewAddress) -> Result<Address, RepositoryError>;

    /// Look up an address by id, regardless of owner.
    async fn find(&self, id: AddressId) -> Result<Option<Address>, RepositoryError>;

    /// All addresses owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Address>, RepositoryError>;

    /// Apply `changes` to an owned address. Returns `None` if no such address.
    async fn update(
        &self,
        owner: UserId,
        id: AddressId,
        changes: &AddressChanges,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Delete an owned address. Returns `false` if no such address.
    async fn delete(&self, owner: UserId, id: AddressId) -> Result<bool, RepositoryError>;

    /// Make an owned address the owner's only default.
    async fn set_default(
        &self,
        owner: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
