//! # REST Handlers
//!
//! Request handlers, shared state and response types for the REST API.

use crate::application::error::ApplicationError;
use crate::application::serializer::WireSerializer;
use crate::application::services::{EntityClients, EntityStoreClient};
use crate::domain::entities::EntityKind;
use crate::domain::value_objects::Timestamp;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// One store client per entity kind.
    pub clients: EntityClients,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(clients: EntityClients) -> Self {
        Self { clients }
    }

    fn client(&self, kind: EntityKind) -> &EntityStoreClient {
        self.clients.get(kind)
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Offending field names, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Creates an error response without field details.
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            fields: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Time of the check.
    pub timestamp: Timestamp,
}

/// Query parameters for random selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RandomQuery {
    /// Parent deck id.
    pub deck: Option<String>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Failure from the application layer.
    Application(ApplicationError),
    /// The path names no entity kind.
    UnknownKind(String),
    /// The request body is not JSON.
    MalformedBody(String),
    /// A required query parameter is absent.
    MissingParameter(&'static str),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Application(err) => match err {
                ApplicationError::InvalidId(_)
                | ApplicationError::Validation(_)
                | ApplicationError::Unsupported(_) => StatusCode::BAD_REQUEST,
                ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApplicationError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ApplicationError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::UnknownKind(_) => StatusCode::NOT_FOUND,
            Self::MalformedBody(_) | Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::Application(err) => {
                let mut body = ErrorResponse::new(err.code(), err.to_string());
                if let ApplicationError::Validation(validation) = err {
                    body.fields = Some(
                        validation
                            .fields()
                            .into_iter()
                            .map(str::to_owned)
                            .collect(),
                    );
                }
                body
            }
            Self::UnknownKind(kind) => {
                ErrorResponse::new("UNKNOWN_ENTITY_KIND", format!("unknown entity kind: {kind}"))
            }
            Self::MalformedBody(reason) => ErrorResponse::new("MALFORMED_BODY", reason.clone()),
            Self::MissingParameter(name) => ErrorResponse::new(
                "MISSING_PARAMETER",
                format!("query parameter `{name}` is required"),
            ),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        Self::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %body.message, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %body.message, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

fn parse_kind(raw: &str) -> Result<EntityKind, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::UnknownKind(raw.to_owned()))
}

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        timestamp: Timestamp::now(),
    })
}

/// `POST /api/v1/{kind}`
///
/// Validates the payload, writes the record and returns it with its id.
///
/// # Errors
///
/// Returns [`ApiError`] for an unknown kind, a malformed or invalid body,
/// or a store failure.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Map<String, Value>>), ApiError> {
    let kind = parse_kind(&kind)?;
    let Json(payload) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;

    let serializer = WireSerializer::new(kind.descriptor());
    let record = serializer
        .from_wire(&payload)
        .map_err(ApplicationError::from)?;
    let stored = state.client(kind).insert(record).await?;

    Ok((StatusCode::CREATED, Json(serializer.to_wire(&stored))))
}

/// `GET /api/v1/{kind}/{id}`
///
/// # Errors
///
/// Returns [`ApiError`] for an unknown kind, a malformed id, an absent
/// record or a store failure.
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let record = state.client(kind).get_by_id(id.as_str()).await?;
    Ok(Json(WireSerializer::new(kind.descriptor()).to_wire(&record)))
}

/// `GET /api/v1/{kind}/random?deck={deck_id}`
///
/// # Errors
///
/// Returns [`ApiError`] for an unknown kind, a missing or malformed deck
/// id, a kind without random selection, an empty draw or a store failure.
pub async fn get_random_record(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let deck = query.deck.ok_or(ApiError::MissingParameter("deck"))?;
    let record = state.client(kind).get_random(deck.as_str()).await?;
    Ok(Json(WireSerializer::new(kind.descriptor()).to_wire(&record)))
}
