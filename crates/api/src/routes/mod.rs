//! HTTP route handlers for the address API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness check
//! GET    /health/ready                   - Readiness check (pings the store)
//!
//! # Addresses (requires auth)
//! GET    /addresses                      - List the caller's addresses
//! POST   /addresses                      - Create an address
//! GET    /addresses/{id}                 - Show an address
//! PUT    /addresses/{id}                 - Partially update an address
//! DELETE /addresses/{id}                 - Delete an address
//! PUT    /addresses/{id}/set-default     - Make an address the default
//! ```

pub mod addresses;
pub mod health;

use axum::{
    Router,
    extract::Request,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
        .route("/{id}/set-default", put(addresses::set_default))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/addresses", address_routes())
}

/// Build the complete application with request tracing.
///
/// Sentry layers are added by the binary so tests run without a hub.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{HeaderMap, Method, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use parcel_core::{Address, AddressChanges, AddressId, NewAddress, UserId};

    use super::*;
    use crate::db::{AddressStore, InMemoryAddressStore, RepositoryError};
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::session::StaticSessionResolver;

    const COOKIE: &str = "parcel_session";
    const ALICE: &str = "alice-token";
    const BOB: &str = "bob-token";

    struct Harness {
        app: Router,
        alice: UserId,
    }

    fn harness_with(store: Arc<dyn AddressStore>) -> Harness {
        let alice = UserId::generate();
        let sessions = StaticSessionResolver::new(COOKIE)
            .with_session(ALICE, alice)
            .with_session(BOB, UserId::generate());
        Harness {
            app: app(AppState::new(store, Arc::new(sessions))),
            alice,
        }
    }

    fn harness() -> Harness {
        harness_with(Arc::new(InMemoryAddressStore::new()))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("{COOKIE}={token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    async fn create(app: &Router, token: &str, body: Value) -> Value {
        let (status, _, body) =
            send(app, Method::POST, "/addresses", Some(token), Some(body.to_string())).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
        body["data"].clone()
    }

    fn portland(street: &str) -> Value {
        json!({ "street": street, "city": "Portland", "state": "OR", "postalCode": "97201" })
    }

    #[tokio::test]
    async fn test_requests_without_session_are_unauthorized() {
        let h = harness();

        for (method, uri) in [
            (Method::GET, "/addresses"),
            (Method::POST, "/addresses"),
            (Method::GET, "/addresses/whatever"),
            (Method::DELETE, "/addresses/whatever"),
            (Method::PUT, "/addresses/whatever/set-default"),
        ] {
            let (status, _, body) = send(&h.app, method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["success"], false);
        }

        let (status, _, _) = send(&h.app, Method::GET, "/addresses", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_uses_session_owner() {
        let h = harness();
        let mut body = portland("1 Main St");
        body["ownerId"] = json!(UserId::generate().to_string());
        body["userId"] = json!("someone-else");

        let created = create(&h.app, ALICE, body).await;

        assert_eq!(created["ownerId"], h.alice.to_string());
        assert_eq!(created["isDefault"], false);
        assert!(created.get("latitude").is_some());
    }

    #[tokio::test]
    async fn test_create_reports_missing_fields() {
        let h = harness();
        let body = json!({ "street": "1 Main St", "city": "" });

        let (status, _, body) =
            send(&h.app, Method::POST, "/addresses", Some(ALICE), Some(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: city, state, postalCode");

        let (_, _, listed) = send(&h.app, Method::GET, "/addresses", Some(ALICE), None).await;
        assert_eq!(listed["data"], json!([]));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let h = harness();
        let (status, _, body) = send(
            &h.app,
            Method::POST,
            "/addresses",
            Some(ALICE),
            Some("{ not json".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unparseable_id_is_not_found() {
        let h = harness();
        let (status, _, body) =
            send(&h.app, Method::GET, "/addresses/not-a-uuid", Some(ALICE), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Address not found or unauthorized");
    }

    #[tokio::test]
    async fn test_other_users_address_is_not_found() {
        let h = harness();
        let created = create(&h.app, ALICE, portland("1 Main St")).await;
        let uri = format!("/addresses/{}", created["id"].as_str().unwrap());

        let (status, _, _) = send(&h.app, Method::GET, &uri, Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let patch = json!({ "city": "Salem" }).to_string();
        let (status, _, _) = send(&h.app, Method::PUT, &uri, Some(BOB), Some(patch)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(&h.app, Method::DELETE, &uri, Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = send(&h.app, Method::GET, &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["city"], "Portland");
    }

    #[tokio::test]
    async fn test_update_missing_address_is_not_found() {
        let h = harness();
        let uri = format!("/addresses/{}", AddressId::generate());
        let patch = json!({ "city": "Salem" }).to_string();

        let (status, _, _) = send(&h.app, Method::PUT, &uri, Some(ALICE), Some(patch)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_ignores_server_managed_fields() {
        let h = harness();
        let created = create(&h.app, ALICE, portland("1 Main St")).await;
        let uri = format!("/addresses/{}", created["id"].as_str().unwrap());

        let patch = json!({
            "id": AddressId::generate().to_string(),
            "ownerId": UserId::generate().to_string(),
            "createdAt": "2000-01-01T00:00:00Z",
            "latitude": 45.5,
        })
        .to_string();
        let (status, _, body) = send(&h.app, Method::PUT, &uri, Some(ALICE), Some(patch)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], created["id"]);
        assert_eq!(body["data"]["ownerId"], created["ownerId"]);
        assert_eq!(body["data"]["createdAt"], created["createdAt"]);
        assert_eq!(body["data"]["latitude"], 45.5);
    }

    #[tokio::test]
    async fn test_set_default_moves_the_flag() {
        let h = harness();
        let a = create(&h.app, ALICE, portland("1 A St")).await;
        let mut b_body = portland("2 B St");
        b_body["isDefault"] = json!(true);
        let b = create(&h.app, ALICE, b_body).await;

        let uri = format!("/addresses/{}/set-default", a["id"].as_str().unwrap());
        let (status, _, body) = send(&h.app, Method::PUT, &uri, Some(ALICE), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Default address updated successfully");
        assert_eq!(body["data"]["isDefault"], true);

        let (_, _, listed) = send(&h.app, Method::GET, "/addresses", Some(ALICE), None).await;
        let listed = listed["data"].as_array().unwrap().clone();
        let default_ids: Vec<&Value> = listed
            .iter()
            .filter(|addr| addr["isDefault"] == true)
            .map(|addr| &addr["id"])
            .collect();
        assert_eq!(default_ids, vec![&a["id"]]);
        assert!(listed.iter().any(|addr| addr["id"] == b["id"]));
    }

    #[tokio::test]
    async fn test_delete_returns_message() {
        let h = harness();
        let created = create(&h.app, ALICE, portland("1 Main St")).await;
        let uri = format!("/addresses/{}", created["id"].as_str().unwrap());

        let (status, _, body) = send(&h.app, Method::DELETE, &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "message": "Address deleted successfully" })
        );

        let (status, _, _) = send(&h.app, Method::GET, &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Store whose every call fails like an unreachable database.
    struct UnavailableStore;

    fn unavailable() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl AddressStore for UnavailableStore {
        async fn create(&self, _: UserId, _: NewAddress) -> Result<Address, RepositoryError> {
            Err(unavailable())
        }
        async fn find(&self, _: AddressId) -> Result<Option<Address>, RepositoryError> {
            Err(unavailable())
        }
        async fn list_by_owner(&self, _: UserId) -> Result<Vec<Address>, RepositoryError> {
            Err(unavailable())
        }
        async fn update(
            &self,
            _: UserId,
            _: AddressId,
            _: &AddressChanges,
        ) -> Result<Option<Address>, RepositoryError> {
            Err(unavailable())
        }
        async fn delete(&self, _: UserId, _: AddressId) -> Result<bool, RepositoryError> {
            Err(unavailable())
        }
        async fn set_default(
            &self,
            _: UserId,
            _: AddressId,
        ) -> Result<Option<Address>, RepositoryError> {
            Err(unavailable())
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let h = harness_with(Arc::new(UnavailableStore));

        let (status, _, body) = send(&h.app, Method::GET, "/addresses", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Internal server error" }));

        let (status, _, _) = send(&h.app, Method::GET, "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let h = harness();

        let (status, headers, _) = send(&h.app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(REQUEST_ID_HEADER));

        let request = axum::http::Request::builder()
            .uri("/health/ready")
            .header(REQUEST_ID_HEADER, "upstream-42")
            .body(Body::empty())
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "upstream-42");
    }
}
