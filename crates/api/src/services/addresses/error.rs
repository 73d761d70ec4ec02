//! Address service error types.

use thiserror::Error;

use parcel_core::ValidationError;

use crate::db::RepositoryError;

/// Errors that can occur during address operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// Submitted fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The address does not exist, or belongs to another user.
    ///
    /// These two cases must stay a single variant. Reporting them apart
    /// would tell a caller which address ids exist for other users.
    #[error("Address not found or unauthorized")]
    NotFoundOrUnauthorized,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
