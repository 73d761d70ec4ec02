//! Address service.
//!
//! Every operation takes the owner id from the authenticated session, never
//! from the request body.

mod error;

pub use error::AddressError;

use parcel_core::{Address, AddressChanges, AddressDraft, AddressId, UserId};

use crate::db::AddressStore;

/// Owner-scoped address operations.
pub struct AddressService<'a> {
    store: &'a dyn AddressStore,
}

impl<'a> AddressService<'a> {
    /// Create a new address service.
    #[must_use]
    pub const fn new(store: &'a dyn AddressStore) -> Self {
        Self { store }
    }

    /// Validate `draft` and store it as a new address for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Validation` if a required field is missing or
    /// blank. Nothing is written in that case.
    pub async fn create(&self, owner: UserId, draft: AddressDraft) -> Result<Address, AddressError> {
        let address = draft.validate()?;
        let created = self.store.create(owner, address).await?;

        tracing::info!(
            owner_id = %owner,
            address_id = %created.id,
            is_default = created.is_default,
            "Address created"
        );

        Ok(created)
    }

    /// All addresses owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Repository` if the store fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Address>, AddressError> {
        Ok(self.store.list_by_owner(owner).await?)
    }

    /// Fetch one address owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFoundOrUnauthorized` if the address is
    /// missing or owned by someone else.
    pub async fn get(&self, owner: UserId, id: AddressId) -> Result<Address, AddressError> {
        // One arm for both "missing" and "not yours".
        match self.store.find(id).await? {
            Some(address) if address.owner_id == owner => Ok(address),
            _ => Err(AddressError::NotFoundOrUnauthorized),
        }
    }

    /// Apply the supplied fields of `changes` to an owned address.
    ///
    /// An empty change set returns the current record unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFoundOrUnauthorized` if the address is not
    /// owned by `owner`, or `AddressError::Validation` if a supplied
    /// required field is blank.
    pub async fn update(
        &self,
        owner: UserId,
        id: AddressId,
        changes: AddressChanges,
    ) -> Result<Address, AddressError> {
        let current = self.get(owner, id).await?;
        let changes = changes.validate()?;

        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .store
            .update(owner, id, &changes)
            .await?
            .ok_or(AddressError::NotFoundOrUnauthorized)?;

        tracing::info!(owner_id = %owner, address_id = %id, "Address updated");

        Ok(updated)
    }

    /// Delete an owned address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFoundOrUnauthorized` if the address is not
    /// owned by `owner`.
    pub async fn delete(&self, owner: UserId, id: AddressId) -> Result<(), AddressError> {
        self.get(owner, id).await?;

        if !self.store.delete(owner, id).await? {
            return Err(AddressError::NotFoundOrUnauthorized);
        }

        tracing::info!(owner_id = %owner, address_id = %id, "Address deleted");

        Ok(())
    }

    /// Make an owned address the owner's only default.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFoundOrUnauthorized` if the address is not
    /// owned by `owner`.
    pub async fn set_default(&self, owner: UserId, id: AddressId) -> Result<Address, AddressError> {
        self.get(owner, id).await?;

        let updated = self
            .store
            .set_default(owner, id)
            .await?
            .ok_or(AddressError::NotFoundOrUnauthorized)?;

        tracing::info!(owner_id = %owner, address_id = %id, "Default address changed");

        Ok(updated)
    }
}
