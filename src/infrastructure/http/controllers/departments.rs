use crate::{
    application::services::policy,
    domain::entities::{
        AppointHeadRequest, DepartmentHeadDetails, DepartmentRequest, DepartmentResponse,
        DoctorResponse, StockDepartment, StockDetails, UpsertStockRequest,
    },
    infrastructure::http::{
        extract::{Json, Path, Query},
        middleware::{ApiResult, AppState, AuthenticatedUser},
    },
    shared::pagination::{Paged, PaginationParams},
};
use axum::{extract::State, http::StatusCode};

pub async fn list_departments(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Paged<DepartmentResponse>>> {
    let departments = state.department_service.list(params.into()).await?;
    Ok(Json(departments))
}

pub async fn create_department(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentResponse>)> {
    auth_user.require(policy::ADMIN)?;
    let department = state.department_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get_department(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DepartmentResponse>> {
    let department = state.department_service.get(&id).await?;
    Ok(Json(department))
}

pub async fn update_department(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    auth_user.require(policy::ADMIN)?;
    let department = state.department_service.update(&id, request).await?;
    Ok(Json(department))
}

pub async fn delete_department(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::ADMIN)?;
    state.department_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_department_doctors(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<DoctorResponse>>> {
    let doctors = state.department_service.list_doctors(&id).await?;
    Ok(Json(doctors))
}

// Department heads

pub async fn get_department_head(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DepartmentHeadDetails>> {
    let head = state.department_service.get_head(&id).await?;
    Ok(Json(head))
}

pub async fn appoint_department_head(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<AppointHeadRequest>,
) -> ApiResult<Json<DepartmentHeadDetails>> {
    auth_user.require(policy::ADMIN)?;
    let head = state.department_service.appoint_head(&id, request).await?;
    Ok(Json(head))
}

pub async fn remove_department_head(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth_user.require(policy::ADMIN)?;
    state.department_service.remove_head(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_department_heads(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<DepartmentHeadDetails>>> {
    let heads = state.department_service.list_heads().await?;
    Ok(Json(heads))
}

// Department stock

pub async fn list_department_stock(
    State(state): State<AppState>,
    axum::Extension(_auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<StockDetails>>> {
    let stock = state.medication_service.list_department_stock(&id).await?;
    Ok(Json(stock))
}

pub async fn upsert_department_stock(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpsertStockRequest>,
) -> ApiResult<Json<StockDepartment>> {
    auth_user.require(policy::PHARMACY)?;
    let stock = state.medication_service.upsert_stock(&id, request).await?;
    Ok(Json(stock))
}
