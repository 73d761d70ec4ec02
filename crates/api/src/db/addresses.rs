//! `PostgreSQL` address store.
//!
//! Writes that can produce a default address first take a transaction-scoped
//! advisory lock keyed by the owner, so concurrent default changes for one
//! owner run one after another. The partial unique index on
//! `(owner_id) WHERE is_default` backs this up; a violation surfaces as
//! `RepositoryError::Conflict`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use parcel_core::{Address, AddressChanges, AddressId, NewAddress, UserId};

use super::{AddressStore, RepositoryError};

/// Address store backed by the `parcel.address` table.
#[derive(Debug, Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

impl PgAddressStore {
    /// Create a new address store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn create(&self, owner: UserId, address: NewAddress) -> Result<Address, RepositoryError> {
        let id = AddressId::generate();
        let mut tx = self.pool.begin().await?;

        if address.is_default {
            lock_owner(&mut tx, owner).await?;
            clear_other_defaults(&mut tx, owner, id).await?;
        }

        let created = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO parcel.address (
                id, owner_id, street, city, state, postal_code,
                latitude, longitude, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, owner_id, street, city, state, postal_code,
                      latitude, longitude, is_default, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(address.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error)?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, owner_id, street, city, state, postal_code,
                   latitude, longitude, is_default, created_at, updated_at
            FROM parcel.address
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r"
            SELECT id, owner_id, street, city, state, postal_code,
                   latitude, longitude, is_default, created_at, updated_at
            FROM parcel.address
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    async fn update(
        &self,
        owner: UserId,
        id: AddressId,
        changes: &AddressChanges,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if changes.is_default == Some(true) {
            lock_owner(&mut tx, owner).await?;
            clear_other_defaults(&mut tx, owner, id).await?;
        }

        // Coordinates are bound as (supplied, value) pairs so that an explicit
        // null clears the column while an absent field leaves it alone.
        let updated = sqlx::query_as::<_, Address>(
            r"
            UPDATE parcel.address
            SET street      = COALESCE($3, street),
                city        = COALESCE($4, city),
                state       = COALESCE($5, state),
                postal_code = COALESCE($6, postal_code),
                latitude    = CASE WHEN $7 THEN $8 ELSE latitude END,
                longitude   = CASE WHEN $9 THEN $10 ELSE longitude END,
                is_default  = COALESCE($11, is_default),
                updated_at  = clock_timestamp()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, street, city, state, postal_code,
                      latitude, longitude, is_default, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(changes.street.as_deref())
        .bind(changes.city.as_deref())
        .bind(changes.state.as_deref())
        .bind(changes.postal_code.as_deref())
        .bind(changes.latitude.is_some())
        .bind(changes.latitude.flatten())
        .bind(changes.longitude.is_some())
        .bind(changes.longitude.flatten())
        .bind(changes.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error)?;

        // Dropping the transaction rolls back any cleared defaults.
        let Some(updated) = updated else {
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn delete(&self, owner: UserId, id: AddressId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM parcel.address
            WHERE id = $1 AND owner_id = $2
            ",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_default(
        &self,
        owner: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_owner(&mut tx, owner).await?;
        clear_other_defaults(&mut tx, owner, id).await?;

        let updated = sqlx::query_as::<_, Address>(
            r"
            UPDATE parcel.address
            SET is_default = TRUE,
                updated_at = clock_timestamp()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, street, city, state, postal_code,
                      latitude, longitude, is_default, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error)?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Serialize default-address writes for one owner until the transaction ends.
async fn lock_owner(conn: &mut PgConnection, owner: UserId) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(owner)
        .execute(conn)
        .await?;
    Ok(())
}

/// Clear `is_default` on every address of `owner` except `keep`.
async fn clear_other_defaults(
    conn: &mut PgConnection,
    owner: UserId,
    keep: AddressId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE parcel.address
        SET is_default = FALSE,
            updated_at = clock_timestamp()
        WHERE owner_id = $1 AND is_default AND id <> $2
        ",
    )
    .bind(owner)
    .bind(keep)
    .execute(conn)
    .await?;
    Ok(())
}

fn write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("owner already has a default address".to_owned());
    }
    RepositoryError::Database(e)
}
