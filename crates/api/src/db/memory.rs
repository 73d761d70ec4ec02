//! In-memory address store.
//!
//! Intended for tests and local development. Each operation runs under a
//! single lock, so every mutation is atomic with respect to the others.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use parcel_core::{Address, AddressChanges, AddressId, NewAddress, UserId};

use super::{AddressStore, RepositoryError};

/// Process-local address store.
#[derive(Debug, Default)]
pub struct InMemoryAddressStore {
    // Kept in insertion order.
    rows: RwLock<Vec<Address>>,
}

impl InMemoryAddressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn clear_other_defaults(rows: &mut [Address], owner: UserId, keep: AddressId) {
    let now = Utc::now();
    for row in rows
        .iter_mut()
        .filter(|r| r.owner_id == owner && r.is_default && r.id != keep)
    {
        row.is_default = false;
        row.updated_at = now;
    }
}

#[async_trait]
impl AddressStore for InMemoryAddressStore {
    async fn create(&self, owner: UserId, address: NewAddress) -> Result<Address, RepositoryError> {
        let mut rows = self.rows.write().await;
        let now = Utc::now();

        let created = Address {
            id: AddressId::generate(),
            owner_id: owner,
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            latitude: address.latitude,
            longitude: address.longitude,
            is_default: address.is_default,
            created_at: now,
            updated_at: now,
        };

        if created.is_default {
            clear_other_defaults(&mut rows, owner, created.id);
        }
        rows.push(created.clone());

        Ok(created)
    }

    async fn find(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = self.rows.read().await;
        let mut owned: Vec<Address> = rows
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner)
            .cloned()
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps.
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update(
        &self,
        owner: UserId,
        id: AddressId,
        changes: &AddressChanges,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut rows = self.rows.write().await;

        if !rows.iter().any(|r| r.id == id && r.owner_id == owner) {
            return Ok(None);
        }
        if changes.is_default == Some(true) {
            clear_other_defaults(&mut rows, owner, id);
        }

        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.apply(changes);
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, owner: UserId, id: AddressId) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.owner_id == owner));
        Ok(rows.len() < before)
    }

    async fn set_default(
        &self,
        owner: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        self.update(
            owner,
            id,
            &AddressChanges {
                is_default: Some(true),
                ..AddressChanges::default()
            },
        )
        .await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
