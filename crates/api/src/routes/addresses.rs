//! Address book handlers.
//!
//! The owner of every record is the session principal. Any `ownerId`,
//! `userId` or `id` in a request body is ignored.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use parcel_core::{Address, AddressChanges, AddressDraft, AddressId};

use crate::error::{ApiJson, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::AddressError;
use crate::state::AppState;

/// An id that cannot name any address reads as "not found".
fn parse_id(raw: &str) -> Result<AddressId> {
    raw.parse()
        .map_err(|_| AddressError::NotFoundOrUnauthorized.into())
}

/// List the caller's addresses, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<ApiResponse<Vec<Address>>> {
    let addresses = state.addresses().list(principal.user_id).await?;
    Ok(ApiResponse::ok(addresses))
}

/// Create an address for the caller.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    ApiJson(draft): ApiJson<AddressDraft>,
) -> Result<(StatusCode, ApiResponse<Address>)> {
    let address = state.addresses().create(principal.user_id, draft).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(address)))
}

/// Show one of the caller's addresses.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Address>> {
    let id = parse_id(&id)?;
    let address = state.addresses().get(principal.user_id, id).await?;
    Ok(ApiResponse::ok(address))
}

/// Apply a partial update to one of the caller's addresses.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<AddressChanges>,
) -> Result<ApiResponse<Address>> {
    let id = parse_id(&id)?;
    let address = state
        .addresses()
        .update(principal.user_id, id, changes)
        .await?;
    Ok(ApiResponse::ok(address))
}

/// Delete one of the caller's addresses.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let id = parse_id(&id)?;
    state.addresses().delete(principal.user_id, id).await?;
    Ok(ApiResponse::message("Address deleted successfully"))
}

/// Make one of the caller's addresses their only default.
pub async fn set_default(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Address>> {
    let id = parse_id(&id)?;
    let address = state
        .addresses()
        .set_default(principal.user_id, id)
        .await?;
    Ok(ApiResponse::ok(address).with_message("Default address updated successfully"))
}
