//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::AddressStore;
use crate::services::AddressService;
use crate::session::SessionResolver;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Both the address store and
/// the session resolver are trait objects so tests can swap in in-memory
/// implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    addresses: Arc<dyn AddressStore>,
    sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(addresses: Arc<dyn AddressStore>, sessions: Arc<dyn SessionResolver>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                addresses,
                sessions,
            }),
        }
    }

    /// Address service bound to this state's store.
    #[must_use]
    pub fn addresses(&self) -> AddressService<'_> {
        AddressService::new(self.inner.addresses.as_ref())
    }

    /// Get a reference to the underlying address store.
    #[must_use]
    pub fn store(&self) -> &dyn AddressStore {
        self.inner.addresses.as_ref()
    }

    /// Get a reference to the session resolver.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionResolver {
        self.inner.sessions.as_ref()
    }
}
