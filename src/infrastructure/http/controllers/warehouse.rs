use crate::{
    application::services::policy,
    domain::entities::{
        CreateWarehouseRequest, ResolveRequest, WarehouseRequestDetails, WarehouseRequestFilter,
    },
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_requests(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(filter): Query<WarehouseRequestFilter>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<WarehouseRequestDetails>>> {
    let requests = state.warehouse_service.list(filter, params.into()).await?;
    Ok(Json(requests))
}

pub async fn create_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateWarehouseRequest>,
) -> ApiResult<(StatusCode, Json<WarehouseRequestDetails>)> {
    auth_user.require(policy::WAREHOUSE_REQUESTERS)?;
    let created = state.warehouse_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_request(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<WarehouseRequestDetails>> {
    let request = state.warehouse_service.get(&id).await?;
    Ok(Json(request))
}

pub async fn approve_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<WarehouseRequestDetails>> {
    auth_user.require(policy::PHARMACY)?;
    let request = state.warehouse_service.approve(&id).await?;
    tracing::info!(
        "Warehouse request {} approved by {}",
        id,
        auth_user.user.username
    );
    Ok(Json(request))
}

/// The body is optional; an empty POST rejects without notes.
pub async fn reject_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Option<Json<ResolveRequest>>,
) -> ApiResult<Json<WarehouseRequestDetails>> {
    auth_user.require(policy::PHARMACY)?;
    let resolve = body.map(|Json(r)| r).unwrap_or_default();
    let request = state.warehouse_service.reject(&id, resolve).await?;
    Ok(Json(request))
}

pub async fn delete_request(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::WAREHOUSE_REQUESTERS)?;
    state.warehouse_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
