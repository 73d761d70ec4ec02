//! Domain models for the API.
//!
//! Address types live in `parcel-core`; this module holds the session
//! payload shared with the auth service.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
