//! # REST Routes
//!
//! Router construction for the REST API.

use crate::api::rest::handlers::{self, AppState};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// API path prefix.
pub const API_PREFIX: &str = "/api/v1";

/// Creates the API router.
///
/// `{kind}` is one of `phrase-decks`, `phrase-cards`, `nomination-decks`
/// or `nomination-cards`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/{kind}", post(handlers::create_record))
        .route("/{kind}/random", get(handlers::get_random_record))
        .route("/{kind}/{id}", get(handlers::get_record))
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::rest::handlers::{ErrorResponse, HealthResponse};
    use crate::application::services::{EntityClients, FixedOrderPicker};
    use crate::infrastructure::persistence::in_memory::InMemoryColumnFamilyStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        store: Arc<InMemoryColumnFamilyStore>,
    }

    fn harness(order: i64) -> Harness {
        let store = Arc::new(InMemoryColumnFamilyStore::new());
        let clients = EntityClients::with_selection(
            store.clone(),
            Arc::new(FixedOrderPicker::new(order)),
            None,
        );
        Harness {
            router: create_router(Arc::new(AppState::new(clients))),
            store,
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    async fn create_deck(router: &Router, kind: &str) -> String {
        let (status, body) = send(
            router,
            Method::POST,
            &format!("/api/v1/{kind}"),
            Some(json!({ "name": "Classics", "description": "The originals" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let deck: Value = parse(&body);
        deck["deck_id"].as_str().unwrap().to_owned()
    }

    mod health {
        use super::*;

        #[tokio::test]
        async fn reports_ok() {
            let h = harness(1);
            let (status, body) = send(&h.router, Method::GET, "/api/v1/health", None).await;
            assert_eq!(status, StatusCode::OK);
            let health: HealthResponse = parse(&body);
            assert_eq!(health.status, "ok");
            assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn deck_is_created_with_id() {
            let h = harness(1);
            let id = create_deck(&h.router, "phrase-decks").await;
            assert_eq!(id.len(), 36);
            assert_eq!(h.store.len("phrase_deck"), 1);
            assert_eq!(h.store.len("nomination_deck"), 0);
        }

        #[tokio::test]
        async fn card_round_trips_through_the_api() {
            let h = harness(2);
            let deck = create_deck(&h.router, "nomination-decks").await;

            let (status, body) = send(
                &h.router,
                Method::POST,
                "/api/v1/nomination-cards",
                Some(json!({
                    "deck": deck,
                    "term": "Banana",
                    "description": "A yellow fruit",
                    "order": "2",
                    "active": true,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            let created: Value = parse(&body);
            assert_eq!(created["deck"], deck.as_str());
            assert_eq!(created["order"], 2);
            let id = created["nomination_card_id"].as_str().unwrap();

            let (status, body) = send(
                &h.router,
                Method::GET,
                &format!("/api/v1/nomination-cards/{id}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(parse::<Value>(&body), created);
        }

        #[tokio::test]
        async fn validation_failure_lists_fields() {
            let h = harness(1);
            let (status, body) = send(
                &h.router,
                Method::POST,
                "/api/v1/phrase-cards",
                Some(json!({ "deck": "nope", "description": "d", "order": 1 })),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            let error: ErrorResponse = parse(&body);
            assert_eq!(error.error, "VALIDATION_ERROR");
            assert_eq!(
                error.fields,
                Some(vec!["term".to_owned(), "deck".to_owned()])
            );
            assert!(h.store.is_empty());
        }

        #[tokio::test]
        async fn malformed_json_is_bad_request() {
            let h = harness(1);
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/v1/phrase-decks")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap();
            let response = h.router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let error: ErrorResponse = parse(&bytes);
            assert_eq!(error.error, "MALFORMED_BODY");
        }

        #[tokio::test]
        async fn unknown_kind_is_not_found() {
            let h = harness(1);
            let (status, body) = send(
                &h.router,
                Method::POST,
                "/api/v1/players",
                Some(json!({ "name": "x" })),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(parse::<ErrorResponse>(&body).error, "UNKNOWN_ENTITY_KIND");
        }

        #[tokio::test]
        async fn store_outage_is_service_unavailable() {
            let h = harness(1);
            h.store.set_available(false);
            let (status, body) = send(
                &h.router,
                Method::POST,
                "/api/v1/phrase-decks",
                Some(json!({ "name": "Classics", "description": "d" })),
            )
            .await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(parse::<ErrorResponse>(&body).error, "STORE_UNAVAILABLE");
        }
    }

    mod get {
        use super::*;

        #[tokio::test]
        async fn absent_record_is_not_found() {
            let h = harness(1);
            let (status, body) = send(
                &h.router,
                Method::GET,
                "/api/v1/phrase-decks/0190f1c2-3b4a-7d5e-8f60-718293a4b5c6",
                None,
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let error: ErrorResponse = parse(&body);
            assert_eq!(error.error, "NOT_FOUND");
            assert!(error.fields.is_none());
        }

        #[tokio::test]
        async fn malformed_id_is_bad_request() {
            let h = harness(1);
            let (status, body) =
                send(&h.router, Method::GET, "/api/v1/phrase-decks/not-a-uuid", None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(parse::<ErrorResponse>(&body).error, "INVALID_ID");
        }
    }

    mod random {
        use super::*;

        async fn seed_card(router: &Router, deck: &str, order: i64) -> Value {
            let (status, body) = send(
                router,
                Method::POST,
                "/api/v1/phrase-cards",
                Some(json!({
                    "deck": deck,
                    "term": "Banana",
                    "description": "A yellow fruit",
                    "order": order,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            parse(&body)
        }

        #[tokio::test]
        async fn returns_card_for_drawn_order() {
            let h = harness(2);
            let deck = create_deck(&h.router, "phrase-decks").await;
            let card = seed_card(&h.router, &deck, 2).await;

            let (status, body) = send(
                &h.router,
                Method::GET,
                &format!("/api/v1/phrase-cards/random?deck={deck}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(parse::<Value>(&body), card);
        }

        #[tokio::test]
        async fn empty_draw_is_not_found() {
            let h = harness(3);
            let deck = create_deck(&h.router, "phrase-decks").await;
            seed_card(&h.router, &deck, 2).await;

            let (status, _) = send(
                &h.router,
                Method::GET,
                &format!("/api/v1/phrase-cards/random?deck={deck}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn missing_deck_parameter_is_bad_request() {
            let h = harness(1);
            let (status, body) =
                send(&h.router, Method::GET, "/api/v1/phrase-cards/random", None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(parse::<ErrorResponse>(&body).error, "MISSING_PARAMETER");
        }

        #[tokio::test]
        async fn decks_have_no_random_selection() {
            let h = harness(1);
            let (status, body) = send(
                &h.router,
                Method::GET,
                "/api/v1/phrase-decks/random?deck=0190f1c2-3b4a-7d5e-8f60-718293a4b5c6",
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(parse::<ErrorResponse>(&body).error, "UNSUPPORTED");
        }
    }
}
