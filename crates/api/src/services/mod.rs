//! Business logic services for the address API.
//!
//! # Services
//!
//! - `addresses` - Owner-scoped address book operations

pub mod addresses;

pub use addresses::{AddressError, AddressService};
