//! Authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use crate::error::{ApiError, set_sentry_user};
use crate::session::Principal;
use crate::state::AppState;

/// Extractor that requires a valid session.
///
/// Rejects with `ApiError::Unauthorized` (401) when the request carries no
/// valid session, on every route.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.user_id)
/// }
/// ```
pub struct RequireAuth(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .sessions()
            .resolve(&parts.headers)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Span::current().record("user_id", tracing::field::display(principal.user_id));
        set_sentry_user(&principal.user_id);

        Ok(Self(principal))
    }
}
