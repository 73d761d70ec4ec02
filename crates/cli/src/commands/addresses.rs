//! Address inspection commands.
//!
//! # Usage
//!
//! ```bash
//! parcel addresses list --owner <uuid>
//! ```

use parcel_api::db::{AddressStore, PgAddressStore};
use parcel_core::{Address, UserId};

use super::{CommandError, database_url};

/// Print an owner's addresses, newest first.
pub async fn list(owner: &str) -> Result<(), CommandError> {
    let owner = owner
        .parse::<UserId>()
        .map_err(|e| CommandError::InvalidOwner(owner.to_owned(), e.to_string()))?;

    let pool = parcel_api::db::create_pool(&database_url()?).await?;
    let addresses = PgAddressStore::new(pool).list_by_owner(owner).await?;

    if addresses.is_empty() {
        tracing::info!(owner_id = %owner, "No addresses found");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    for address in &addresses {
        println!("{}", format_line(address));
    }

    Ok(())
}

fn format_line(address: &Address) -> String {
    let marker = if address.is_default { "*" } else { " " };
    format!(
        "{marker} {}  {}, {}, {} {}",
        address.id, address.street, address.city, address.state, address.postal_code
    )
}
