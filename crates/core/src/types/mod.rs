//! Core types for Parcel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;

pub use address::{Address, AddressChanges, AddressDraft, NewAddress, RequiredField, ValidationError};
pub use id::*;
