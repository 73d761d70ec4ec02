//! Session resolution.
//!
//! Login, password hashing and OAuth all live in the auth service. By the
//! time a request reaches this API the auth service has already written a
//! session record with a [`CurrentUser`] under [`session_keys::CURRENT_USER`]
//! and handed the browser a cookie with the session id. A
//! [`SessionResolver`] turns request headers back into a [`Principal`].
//!
//! Resolvers are injected through `AppState` rather than reached as a
//! global, so handlers can be tested with [`StaticSessionResolver`].

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use thiserror::Error;
use tower_sessions::SessionStore;
use tower_sessions::cookie::Cookie;
use time::OffsetDateTime;
use tower_sessions::session::Id;

use parcel_core::UserId;

use crate::models::{CurrentUser, session_keys};

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
}

/// Errors that prevent a session from being checked at all.
///
/// An absent or invalid session is not an error; resolvers return `Ok(None)`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session_store::Error),
}

/// Resolves the principal for an inbound request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Return the authenticated principal, or `None` if the request carries
    /// no valid session.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, SessionError>;
}

/// Find the named cookie in the request's `Cookie` headers.
fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

/// Resolves principals from a tower-sessions store shared with the auth service.
#[derive(Debug, Clone)]
pub struct SessionStoreResolver<S> {
    store: S,
    cookie_name: String,
}

impl<S: SessionStore> SessionStoreResolver<S> {
    #[must_use]
    pub fn new(store: S, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl<S: SessionStore> SessionResolver for SessionStoreResolver<S> {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, SessionError> {
        let Some(raw_id) = find_cookie(headers, &self.cookie_name) else {
            return Ok(None);
        };
        let Ok(session_id) = raw_id.parse::<Id>() else {
            tracing::debug!("Ignoring malformed session cookie");
            return Ok(None);
        };

        let Some(record) = self.store.load(&session_id).await? else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            return Ok(None);
        }

        let Some(value) = record.data.get(session_keys::CURRENT_USER) else {
            return Ok(None);
        };
        match serde_json::from_value::<CurrentUser>(value.clone()) {
            Ok(user) => Ok(Some(Principal { user_id: user.id })),
            Err(e) => {
                tracing::warn!(error = %e, "Session record has a malformed current user");
                Ok(None)
            }
        }
    }
}

/// Fixed cookie-value to principal mapping.
///
/// Intended for tests and local development.
#[derive(Debug, Clone)]
pub struct StaticSessionResolver {
    cookie_name: String,
    sessions: HashMap<String, UserId>,
}

impl StaticSessionResolver {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: HashMap::new(),
        }
    }

    /// Accept `token` as a session cookie for `user_id`.
    #[must_use]
    pub fn with_session(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.sessions.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl SessionResolver for StaticSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, SessionError> {
        Ok(find_cookie(headers, &self.cookie_name)
            .and_then(|token| self.sessions.get(&token).copied())
            .map(|user_id| Principal { user_id }))
    }
}
