//! Integration test support for Parcel.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no database needed)
//! cargo test -p parcel-integration-tests
//!
//! # PostgreSQL-backed tests
//! DATABASE_URL=postgres://localhost/parcel_test \
//!     cargo test -p parcel-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `address_book` - HTTP tests against a real listener with the in-memory store
//! - `pg_store` - `PgAddressStore` and shared-session tests against `PostgreSQL`

use std::net::SocketAddr;
use std::sync::Arc;

use parcel_api::AppState;
use parcel_api::config::DEFAULT_SESSION_COOKIE;
use parcel_api::db::{AddressStore, InMemoryAddressStore};
use parcel_api::session::{SessionResolver, StaticSessionResolver};
use parcel_core::UserId;

/// The API router served on an ephemeral local port.
///
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the production router around the given store and resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn(
        store: Arc<dyn AddressStore>,
        sessions: Arc<dyn SessionResolver>,
    ) -> std::io::Result<Self> {
        let app = parcel_api::routes::app(AppState::new(store, sessions));
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Test server stopped");
            }
        });

        Ok(Self { base_url, handle })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A user with a session cookie the test server accepts.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub cookie: String,
}

/// In-memory server with two signed-in users.
pub struct AddressBook {
    pub server: TestServer,
    pub alice: TestUser,
    pub bob: TestUser,
}

impl AddressBook {
    /// Start a fresh server backed by an empty in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let alice = test_user("alice-session");
        let bob = test_user("bob-session");
        let sessions = StaticSessionResolver::new(DEFAULT_SESSION_COOKIE)
            .with_session("alice-session", alice.id)
            .with_session("bob-session", bob.id);

        let server = TestServer::spawn(
            Arc::new(InMemoryAddressStore::new()),
            Arc::new(sessions),
        )
        .await?;

        Ok(Self { server, alice, bob })
    }
}

fn test_user(token: &str) -> TestUser {
    TestUser {
        id: UserId::generate(),
        cookie: session_cookie(token),
    }
}

/// `Cookie` header value carrying `token` as the session cookie.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{DEFAULT_SESSION_COOKIE}={token}")
}
