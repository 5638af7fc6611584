//! Administrative HTTP API over the override store and the loaded registry.
//!
//! Routes, relative to wherever the router is nested:
//!
//! - `GET /override` lists stored overrides
//! - `GET /override/:uuid` returns one stored override, enabled or not
//! - `PUT /override/:uuid` stores an override for a loaded component
//! - `GET /components` lists loaded components in discovery order
//! - `GET /schema` returns the merged tree
//!
//! Stored overrides take effect on the next registry build.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::manifest::is_valid_uuid;
use crate::override_store::{OverrideEntry, OverrideStore, OverrideSummary};
use crate::registry::{ComponentDescriptor, ComponentRegistry};
use crate::schema::GlobalSchema;

/// Shared state of the admin router.
#[derive(Debug, Clone)]
pub struct AdminState {
    /// The override store written by `PUT /override/:uuid`.
    pub store: OverrideStore,
    /// The registry the daemon is serving.
    pub registry: Arc<ComponentRegistry>,
}

/// Body of `PUT /override/:uuid`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SaveOverrideRequest {
    /// The override object, or JSON text encoding one.
    pub value: Value,
    /// Whether the override applies; defaults to true.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Response of `PUT /override/:uuid`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SaveOverrideResponse {
    /// Always true on success.
    pub saved: bool,
    /// Uuid the override was stored under.
    pub uuid: String,
    /// Stored enabled flag.
    pub enabled: bool,
}

type ApiError = (StatusCode, String);

fn unprocessable(message: impl Into<String>) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, message.into())
}

/// Checks a save request and returns the payload to store.
pub fn validate_save(
    registry: &ComponentRegistry,
    uuid: &str,
    value: &Value,
) -> Result<Map<String, Value>, String> {
    if !is_valid_uuid(uuid) {
        return Err(format!("invalid component uuid '{}'", uuid));
    }
    if registry.component(uuid).is_none() {
        return Err(format!("no loaded component has uuid '{}'", uuid));
    }
    let parsed;
    let value = match value {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|e| format!("value is not valid JSON: {}", e))?;
            &parsed
        }
        other => other,
    };
    match value {
        Value::Object(map) => Ok(map.clone()),
        _ => Err("value must be a JSON object".to_string()),
    }
}

async fn list_overrides(State(state): State<AdminState>) -> Json<Vec<OverrideSummary>> {
    Json(state.store.list_entries().await)
}

async fn get_override(
    State(state): State<AdminState>,
    Path(uuid): Path<String>,
) -> Result<Json<OverrideEntry>, ApiError> {
    state
        .store
        .get_entry(&uuid)
        .await
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no override stored for '{}'", uuid)))
}

async fn put_override(
    State(state): State<AdminState>,
    Path(uuid): Path<String>,
    Json(request): Json<SaveOverrideRequest>,
) -> Result<Json<SaveOverrideResponse>, ApiError> {
    let payload = validate_save(&state.registry, &uuid, &request.value).map_err(unprocessable)?;
    state
        .store
        .upsert(&uuid, &payload, request.enabled)
        .await
        .map_err(|e| unprocessable(e.to_string()))?;
    Ok(Json(SaveOverrideResponse {
        saved: true,
        uuid,
        enabled: request.enabled,
    }))
}

async fn list_components(State(state): State<AdminState>) -> Json<Vec<ComponentDescriptor>> {
    Json(state.registry.components().to_vec())
}

async fn get_schema(State(state): State<AdminState>) -> Json<GlobalSchema> {
    Json(state.registry.schema().clone())
}

/// Creates the admin router.
pub fn create_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/override", get(list_overrides))
        .route("/override/:uuid", get(get_override).put(put_override))
        .route("/components", get(list_components))
        .route("/schema", get(get_schema))
        .with_state(state)
}
