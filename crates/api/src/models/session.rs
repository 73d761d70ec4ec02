//! Session-related types.
//!
//! The auth service owns login and writes these into the shared session
//! store. This service only reads them.

use serde::{Deserialize, Serialize};

use parcel_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's id in the auth service.
    pub id: UserId,
    /// User's email address, if the auth service recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
