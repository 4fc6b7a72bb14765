//! Router assembly and quality-gate HTTP handlers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Exposes the `QualityGateApi` operations under `/api/qualitygates/*` with
//! JSON bodies, so an out-of-process dashboard can use the emulator in place
//! of the real service. Failed lookups answer 404 with the service's
//! `{"errors":[{"msg": ...}]}` body. `/api/emulator/*` carries the test
//! controls and only works when the state holds an emulator handle.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{ConditionSpec, ErrorCode, QualityGateError};
use crate::model::{
    Condition, GateRef, ListResponse, Operator, SearchGroupsResponse, SearchProjectsResponse, SearchUsersResponse,
    ShowResponse,
};
use crate::state::AppState;

// =============================================================================
// ROUTER
// =============================================================================

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/qualitygates/list", get(list))
        .route("/api/qualitygates/show", get(show))
        .route("/api/qualitygates/create", post(create))
        .route("/api/qualitygates/destroy", post(destroy))
        .route("/api/qualitygates/copy", post(copy))
        .route("/api/qualitygates/rename", post(rename))
        .route("/api/qualitygates/set_as_default", post(set_as_default))
        .route("/api/qualitygates/create_condition", post(create_condition))
        .route("/api/qualitygates/update_condition", post(update_condition))
        .route("/api/qualitygates/delete_condition", post(delete_condition))
        .route("/api/qualitygates/search_users", get(search_users))
        .route("/api/qualitygates/search_groups", get(search_groups))
        .route("/api/qualitygates/search", get(search_projects))
        .route("/api/emulator/reset", post(reset))
        .route("/api/emulator/admin", post(set_admin))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// Service error rendered as a 404 with the `errors` payload.
#[derive(Debug)]
pub struct ApiError(pub QualityGateError);

impl From<QualityGateError> for ApiError {
    fn from(err: QualityGateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(code = self.0.error_code(), error = %self.0, "quality gate request rejected");
        (StatusCode::NOT_FOUND, Json(self.0.to_payload())).into_response()
    }
}

// =============================================================================
// REQUEST SHAPES
// =============================================================================

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: String,
}

#[derive(Deserialize)]
pub struct IdBody {
    pub id: String,
}

#[derive(Deserialize)]
pub struct NameBody {
    pub name: String,
}

#[derive(Deserialize)]
pub struct IdNameBody {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConditionBody {
    pub gate_id: String,
    pub metric: String,
    pub op: Operator,
    pub error: String,
}

#[derive(Deserialize)]
pub struct UpdateConditionBody {
    pub id: String,
    pub metric: String,
    pub op: Operator,
    pub error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub gate_name: String,
    pub q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBody {
    pub is_admin: bool,
}

// =============================================================================
// QUALITY GATES
// =============================================================================

/// `GET /api/qualitygates/list`
pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(state.gates.list().await)
}

/// `GET /api/qualitygates/show?id=` — unknown ids answer 200 with actions only.
pub async fn show(State(state): State<AppState>, Query(query): Query<IdQuery>) -> Json<ShowResponse> {
    Json(state.gates.show(&query.id).await)
}

/// `POST /api/qualitygates/create`
pub async fn create(State(state): State<AppState>, Json(body): Json<NameBody>) -> Json<GateRef> {
    Json(state.gates.create(&body.name).await)
}

/// `POST /api/qualitygates/destroy`
pub async fn destroy(State(state): State<AppState>, Json(body): Json<IdBody>) -> StatusCode {
    state.gates.destroy(&body.id).await;
    StatusCode::NO_CONTENT
}

/// `POST /api/qualitygates/copy`
pub async fn copy(State(state): State<AppState>, Json(body): Json<IdNameBody>) -> Result<Json<GateRef>, ApiError> {
    let copied = state.gates.copy(&body.id, &body.name).await?;
    Ok(Json(copied))
}

/// `POST /api/qualitygates/rename`
pub async fn rename(State(state): State<AppState>, Json(body): Json<IdNameBody>) -> Result<Json<GateRef>, ApiError> {
    let renamed = state.gates.rename(&body.id, &body.name).await?;
    Ok(Json(renamed))
}

/// `POST /api/qualitygates/set_as_default`
pub async fn set_as_default(State(state): State<AppState>, Json(body): Json<IdBody>) -> Result<StatusCode, ApiError> {
    state.gates.set_as_default(&body.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// `POST /api/qualitygates/create_condition`
pub async fn create_condition(
    State(state): State<AppState>,
    Json(body): Json<CreateConditionBody>,
) -> Result<Json<Condition>, ApiError> {
    let spec = ConditionSpec { metric: body.metric, op: body.op, error: body.error };
    let condition = state.gates.create_condition(&body.gate_id, spec).await?;
    Ok(Json(condition))
}

/// `POST /api/qualitygates/update_condition`
pub async fn update_condition(
    State(state): State<AppState>,
    Json(body): Json<UpdateConditionBody>,
) -> Result<Json<Condition>, ApiError> {
    let spec = ConditionSpec { metric: body.metric, op: body.op, error: body.error };
    let condition = state.gates.update_condition(&body.id, spec).await?;
    Ok(Json(condition))
}

/// `POST /api/qualitygates/delete_condition`
pub async fn delete_condition(State(state): State<AppState>, Json(body): Json<IdBody>) -> StatusCode {
    state.gates.delete_condition(&body.id).await;
    StatusCode::NO_CONTENT
}

// =============================================================================
// SEARCHES
// =============================================================================

/// `GET /api/qualitygates/search_users`
pub async fn search_users(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Json<SearchUsersResponse> {
    Json(state.gates.search_users(&query.gate_name, query.q.as_deref()).await)
}

/// `GET /api/qualitygates/search_groups`
pub async fn search_groups(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchGroupsResponse> {
    Json(state.gates.search_groups(&query.gate_name, query.q.as_deref()).await)
}

/// `GET /api/qualitygates/search`
pub async fn search_projects(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchProjectsResponse> {
    Json(state.gates.search_projects(&query.gate_name, query.q.as_deref()).await)
}

// =============================================================================
// TEST CONTROLS
// =============================================================================

/// `POST /api/emulator/reset`
pub async fn reset(State(state): State<AppState>) -> StatusCode {
    let Some(emulator) = state.emulator else {
        return StatusCode::NOT_FOUND;
    };
    emulator.reset().await;
    StatusCode::NO_CONTENT
}

/// `POST /api/emulator/admin`
pub async fn set_admin(State(state): State<AppState>, Json(body): Json<AdminBody>) -> StatusCode {
    let Some(emulator) = state.emulator else {
        return StatusCode::NOT_FOUND;
    };
    emulator.set_is_admin(body.is_admin).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
